use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::Value as JsonValue;

use crate::stats::StockRecord;
use crate::utils::sanitize_day;

#[derive(Clone)]
pub struct SqliteStore {
    path: String,
}

impl SqliteStore {
    pub fn new(path: &str) -> Result<Self> {
        if path.trim().is_empty() {
            anyhow::bail!("SQLITE_PATH is empty");
        }
        if path != ":memory:" && !path.starts_with("file:") {
            if let Some(parent) = Path::new(path).parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create sqlite parent dir for {path}"))?;
            }
        }

        // Note: rusqlite::Connection is not Send/Sync. We keep only a path here
        // and open short-lived connections per operation. WAL keeps this fast
        // enough for dashboard reads and admin-paced writes.
        Ok(Self { path: path.to_string() })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn open_conn(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path).with_context(|| format!("open sqlite {}", self.path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Ok(conn)
    }

    pub fn init_db(&self) -> Result<()> {
        let conn = self.open_conn()?;
        conn.execute_batch(
            r#"
CREATE TABLE IF NOT EXISTS stocks (
  id TEXT PRIMARY KEY,
  code TEXT NOT NULL,
  date TEXT NOT NULL,
  uw TEXT NOT NULL DEFAULT '-',
  float_pct REAL,
  d1 REAL, d2 REAL, d3 REAL, d4 REAL, d5 REAL, d6 REAL, d7 REAL
);

CREATE INDEX IF NOT EXISTS idx_stocks_date ON stocks(date);
CREATE INDEX IF NOT EXISTS idx_stocks_uw ON stocks(uw);

CREATE TABLE IF NOT EXISTS accounts (
  id TEXT PRIMARY KEY,
  entry_number INTEGER,
  name TEXT NOT NULL,
  email TEXT,
  phone TEXT,
  rdn TEXT,
  device_user TEXT
);

CREATE TABLE IF NOT EXISTS profits (
  id TEXT PRIMARY KEY,
  stock_name TEXT NOT NULL,
  profit_amount REAL NOT NULL,
  created_ts REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS expenses (
  id TEXT PRIMARY KEY,
  description TEXT NOT NULL,
  expense_type TEXT,
  amount REAL NOT NULL,
  created_ts REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
  token TEXT PRIMARY KEY,
  email TEXT NOT NULL,
  created_ts REAL NOT NULL,
  expires_ts REAL NOT NULL
);
"#,
        )?;
        Ok(())
    }

    // ---- Stocks ----

    pub fn fetch_all_stocks(&self) -> Result<Vec<StockRecord>> {
        let conn = self.open_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, code, date, uw, float_pct, d1, d2, d3, d4, d5, d6, d7 FROM stocks",
        )?;
        let mut rows = stmt.query([])?;
        let mut out = vec![];
        while let Some(r) = rows.next()? {
            out.push(stock_from_row(r)?);
        }
        Ok(out)
    }

    /// Paged listing with an exact total count: optional substring match on
    /// code, optional exact underwriter filter, newest listing date first.
    pub fn fetch_stocks_page(
        &self,
        page: usize,
        page_size: usize,
        search: Option<&str>,
        uw_filter: Option<&str>,
    ) -> Result<(Vec<StockRecord>, i64)> {
        let conn = self.open_conn()?;

        let mut clauses: Vec<&str> = vec![];
        let mut filter_params: Vec<rusqlite::types::Value> = vec![];
        if let Some(s) = search.map(str::trim).filter(|s| !s.is_empty()) {
            clauses.push("code LIKE ?");
            filter_params.push(rusqlite::types::Value::Text(format!("%{s}%")));
        }
        if let Some(u) = uw_filter.map(str::trim).filter(|s| !s.is_empty()) {
            clauses.push("uw = ?");
            filter_params.push(rusqlite::types::Value::Text(u.to_string()));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM stocks {where_sql}"),
            params_from_iter(filter_params.iter()),
            |r| r.get(0),
        )?;

        let page = page.max(1);
        let mut page_params = filter_params;
        page_params.push(rusqlite::types::Value::Integer(page_size as i64));
        page_params.push(rusqlite::types::Value::Integer(((page - 1) * page_size) as i64));

        let mut stmt = conn.prepare(&format!(
            r#"
SELECT id, code, date, uw, float_pct, d1, d2, d3, d4, d5, d6, d7
FROM stocks
{where_sql}
ORDER BY date DESC
LIMIT ? OFFSET ?
"#,
        ))?;
        let mut rows = stmt.query(params_from_iter(page_params))?;
        let mut out = vec![];
        while let Some(r) = rows.next()? {
            out.push(stock_from_row(r)?);
        }
        Ok((out, count))
    }

    /// Pre-upsert duplicate ticker guard. `exclude_id` lets an edit keep its
    /// own code.
    pub fn check_duplicate_code(&self, code: &str, exclude_id: Option<&str>) -> Result<bool> {
        let conn = self.open_conn()?;
        let hit: Option<String> = match exclude_id {
            None => conn
                .query_row("SELECT id FROM stocks WHERE code = ? LIMIT 1", params![code], |r| {
                    r.get(0)
                })
                .optional()?,
            Some(id) => conn
                .query_row(
                    "SELECT id FROM stocks WHERE code = ? AND id <> ? LIMIT 1",
                    params![code, id],
                    |r| r.get(0),
                )
                .optional()?,
        };
        Ok(hit.is_some())
    }

    pub fn upsert_stock(&self, rec: &StockRecord) -> Result<()> {
        let conn = self.open_conn()?;
        conn.execute(
            r#"
INSERT INTO stocks(id, code, date, uw, float_pct, d1, d2, d3, d4, d5, d6, d7)
VALUES(?,?,?,?,?,?,?,?,?,?,?,?)
ON CONFLICT(id) DO UPDATE SET
  code=excluded.code,
  date=excluded.date,
  uw=excluded.uw,
  float_pct=excluded.float_pct,
  d1=excluded.d1, d2=excluded.d2, d3=excluded.d3, d4=excluded.d4,
  d5=excluded.d5, d6=excluded.d6, d7=excluded.d7
"#,
            params![
                rec.id, rec.code, rec.date, rec.uw, rec.float_pct, rec.d1, rec.d2, rec.d3,
                rec.d4, rec.d5, rec.d6, rec.d7
            ],
        )?;
        Ok(())
    }

    pub fn delete_stock(&self, id: &str) -> Result<usize> {
        let conn = self.open_conn()?;
        let n = conn.execute("DELETE FROM stocks WHERE id = ?", params![id])?;
        Ok(n)
    }

    // ---- Accounts ----

    pub fn fetch_accounts(&self) -> Result<Vec<JsonValue>> {
        let conn = self.open_conn()?;
        let mut stmt = conn.prepare(
            r#"
SELECT id, entry_number, name, email, phone, rdn, device_user
FROM accounts
ORDER BY entry_number ASC, name ASC
"#,
        )?;
        let mut rows = stmt.query([])?;
        let mut out = vec![];
        while let Some(r) = rows.next()? {
            out.push(serde_json::json!({
                "id": r.get::<_, String>(0)?,
                "entry_number": r.get::<_, Option<i64>>(1)?,
                "name": r.get::<_, String>(2)?,
                "email": r.get::<_, Option<String>>(3)?,
                "phone": r.get::<_, Option<String>>(4)?,
                "rdn": r.get::<_, Option<String>>(5)?,
                "device_user": r.get::<_, Option<String>>(6)?,
            }));
        }
        Ok(out)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn upsert_account(
        &self,
        id: &str,
        entry_number: Option<i64>,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        rdn: Option<&str>,
        device_user: Option<&str>,
    ) -> Result<()> {
        let conn = self.open_conn()?;
        conn.execute(
            r#"
INSERT INTO accounts(id, entry_number, name, email, phone, rdn, device_user)
VALUES(?,?,?,?,?,?,?)
ON CONFLICT(id) DO UPDATE SET
  entry_number=excluded.entry_number,
  name=excluded.name,
  email=excluded.email,
  phone=excluded.phone,
  rdn=excluded.rdn,
  device_user=excluded.device_user
"#,
            params![id, entry_number, name, email, phone, rdn, device_user],
        )?;
        Ok(())
    }

    pub fn delete_account(&self, id: &str) -> Result<usize> {
        let conn = self.open_conn()?;
        let n = conn.execute("DELETE FROM accounts WHERE id = ?", params![id])?;
        Ok(n)
    }

    // ---- Bookkeeping ----

    pub fn insert_profit(&self, id: &str, stock_name: &str, amount: f64, ts: f64) -> Result<()> {
        let conn = self.open_conn()?;
        conn.execute(
            "INSERT INTO profits(id, stock_name, profit_amount, created_ts) VALUES(?,?,?,?)",
            params![id, stock_name, amount, ts],
        )?;
        Ok(())
    }

    pub fn delete_profit(&self, id: &str) -> Result<usize> {
        let conn = self.open_conn()?;
        let n = conn.execute("DELETE FROM profits WHERE id = ?", params![id])?;
        Ok(n)
    }

    pub fn fetch_profits(&self) -> Result<Vec<JsonValue>> {
        let conn = self.open_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, stock_name, profit_amount, created_ts FROM profits ORDER BY created_ts DESC",
        )?;
        let mut rows = stmt.query([])?;
        let mut out = vec![];
        while let Some(r) = rows.next()? {
            out.push(serde_json::json!({
                "id": r.get::<_, String>(0)?,
                "stock_name": r.get::<_, String>(1)?,
                "profit_amount": r.get::<_, f64>(2)?,
                "created_ts": r.get::<_, f64>(3)?,
            }));
        }
        Ok(out)
    }

    pub fn insert_expense(
        &self,
        id: &str,
        description: &str,
        expense_type: Option<&str>,
        amount: f64,
        ts: f64,
    ) -> Result<()> {
        let conn = self.open_conn()?;
        conn.execute(
            "INSERT INTO expenses(id, description, expense_type, amount, created_ts) VALUES(?,?,?,?,?)",
            params![id, description, expense_type, amount, ts],
        )?;
        Ok(())
    }

    pub fn delete_expense(&self, id: &str) -> Result<usize> {
        let conn = self.open_conn()?;
        let n = conn.execute("DELETE FROM expenses WHERE id = ?", params![id])?;
        Ok(n)
    }

    pub fn fetch_expenses(&self) -> Result<Vec<JsonValue>> {
        let conn = self.open_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, description, expense_type, amount, created_ts FROM expenses ORDER BY created_ts DESC",
        )?;
        let mut rows = stmt.query([])?;
        let mut out = vec![];
        while let Some(r) = rows.next()? {
            out.push(serde_json::json!({
                "id": r.get::<_, String>(0)?,
                "description": r.get::<_, String>(1)?,
                "expense_type": r.get::<_, Option<String>>(2)?,
                "amount": r.get::<_, f64>(3)?,
                "created_ts": r.get::<_, f64>(4)?,
            }));
        }
        Ok(out)
    }

    pub fn fetch_profit_summary(&self) -> Result<JsonValue> {
        let conn = self.open_conn()?;
        let total_profit: f64 = conn.query_row(
            "SELECT COALESCE(SUM(profit_amount), 0.0) FROM profits",
            [],
            |r| r.get(0),
        )?;
        let total_expense: f64 = conn.query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM expenses",
            [],
            |r| r.get(0),
        )?;
        Ok(serde_json::json!({
            "total_profit": total_profit,
            "total_expense": total_expense,
            "net_profit": total_profit - total_expense,
        }))
    }

    // ---- Sessions ----

    pub fn insert_session(&self, token: &str, email: &str, created_ts: f64, expires_ts: f64) -> Result<()> {
        let conn = self.open_conn()?;
        conn.execute(
            "INSERT INTO sessions(token, email, created_ts, expires_ts) VALUES(?,?,?,?)",
            params![token, email, created_ts, expires_ts],
        )?;
        Ok(())
    }

    /// Returns (email, expires_ts) for a stored token; the caller decides
    /// whether it has expired.
    pub fn fetch_session(&self, token: &str) -> Result<Option<(String, f64)>> {
        let conn = self.open_conn()?;
        let row = conn
            .query_row(
                "SELECT email, expires_ts FROM sessions WHERE token = ?",
                params![token],
                |r| Ok((r.get::<_, String>(0)?, r.get::<_, f64>(1)?)),
            )
            .optional()?;
        Ok(row)
    }

    pub fn delete_session(&self, token: &str) -> Result<usize> {
        let conn = self.open_conn()?;
        let n = conn.execute("DELETE FROM sessions WHERE token = ?", params![token])?;
        Ok(n)
    }

    pub fn purge_expired_sessions(&self, now: f64) -> Result<usize> {
        let conn = self.open_conn()?;
        let n = conn.execute("DELETE FROM sessions WHERE expires_ts <= ?", params![now])?;
        Ok(n)
    }
}

fn stock_from_row(r: &rusqlite::Row<'_>) -> Result<StockRecord> {
    Ok(StockRecord {
        id: r.get(0)?,
        code: r.get(1)?,
        date: r.get(2)?,
        uw: r.get(3)?,
        float_pct: sanitize_day(r.get::<_, Option<f64>>(4)?),
        d1: sanitize_day(r.get::<_, Option<f64>>(5)?),
        d2: sanitize_day(r.get::<_, Option<f64>>(6)?),
        d3: sanitize_day(r.get::<_, Option<f64>>(7)?),
        d4: sanitize_day(r.get::<_, Option<f64>>(8)?),
        d5: sanitize_day(r.get::<_, Option<f64>>(9)?),
        d6: sanitize_day(r.get::<_, Option<f64>>(10)?),
        d7: sanitize_day(r.get::<_, Option<f64>>(11)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_store() -> SqliteStore {
        let path = std::env::temp_dir().join(format!("uwtrack-test-{}.sqlite", Uuid::new_v4()));
        let store = SqliteStore::new(path.to_str().unwrap()).unwrap();
        store.init_db().unwrap();
        store
    }

    fn stock(code: &str, date: &str, uw: &str, d1: Option<f64>) -> StockRecord {
        StockRecord {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            date: date.to_string(),
            uw: uw.to_string(),
            float_pct: None,
            d1,
            d2: None,
            d3: None,
            d4: None,
            d5: None,
            d6: None,
            d7: None,
        }
    }

    #[test]
    fn upsert_fetch_delete_roundtrip() {
        let store = temp_store();
        let mut rec = stock("ABCD", "2024-02-01", "UW1", Some(5.0));
        store.upsert_stock(&rec).unwrap();

        let all = store.fetch_all_stocks().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].code, "ABCD");
        assert_eq!(all[0].d1, Some(5.0));

        // Same id updates in place.
        rec.code = "EFGH".to_string();
        store.upsert_stock(&rec).unwrap();
        let all = store.fetch_all_stocks().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].code, "EFGH");

        assert_eq!(store.delete_stock(&rec.id).unwrap(), 1);
        assert_eq!(store.delete_stock(&rec.id).unwrap(), 0);
        assert!(store.fetch_all_stocks().unwrap().is_empty());
    }

    #[test]
    fn paging_returns_exact_total_and_newest_first() {
        let store = temp_store();
        for i in 0..7 {
            store
                .upsert_stock(&stock(&format!("ST{i}"), &format!("2024-01-0{}", i + 1), "UW1", None))
                .unwrap();
        }

        let (page1, count) = store.fetch_stocks_page(1, 3, None, None).unwrap();
        assert_eq!(count, 7);
        assert_eq!(page1.len(), 3);
        assert_eq!(page1[0].date, "2024-01-07");

        let (page3, _) = store.fetch_stocks_page(3, 3, None, None).unwrap();
        assert_eq!(page3.len(), 1);
        assert_eq!(page3[0].date, "2024-01-01");
    }

    #[test]
    fn search_and_uw_filter_compose() {
        let store = temp_store();
        store.upsert_stock(&stock("AAAA", "2024-01-01", "UW1", None)).unwrap();
        store.upsert_stock(&stock("AABB", "2024-01-02", "UW2", None)).unwrap();
        store.upsert_stock(&stock("CCCC", "2024-01-03", "UW1", None)).unwrap();

        let (rows, count) = store.fetch_stocks_page(1, 10, Some("AA"), None).unwrap();
        assert_eq!(count, 2);
        assert_eq!(rows.len(), 2);

        let (rows, count) = store.fetch_stocks_page(1, 10, Some("AA"), Some("UW1")).unwrap();
        assert_eq!(count, 1);
        assert_eq!(rows[0].code, "AAAA");

        let (_, count) = store.fetch_stocks_page(1, 10, None, Some("UW1")).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn duplicate_check_honors_exclude_id() {
        let store = temp_store();
        let rec = stock("DUPE", "2024-01-01", "-", None);
        store.upsert_stock(&rec).unwrap();

        assert!(store.check_duplicate_code("DUPE", None).unwrap());
        assert!(!store.check_duplicate_code("DUPE", Some(&rec.id)).unwrap());
        assert!(!store.check_duplicate_code("OTHER", None).unwrap());
    }

    #[test]
    fn profit_summary_nets_expenses() {
        let store = temp_store();
        store.insert_profit("p1", "ABCD", 150.0, 1.0).unwrap();
        store.insert_profit("p2", "EFGH", 50.0, 2.0).unwrap();
        store.insert_expense("e1", "data feed", Some("subscription"), 30.0, 3.0).unwrap();

        let summary = store.fetch_profit_summary().unwrap();
        assert_eq!(summary["total_profit"].as_f64(), Some(200.0));
        assert_eq!(summary["total_expense"].as_f64(), Some(30.0));
        assert_eq!(summary["net_profit"].as_f64(), Some(170.0));

        // Newest first.
        let profits = store.fetch_profits().unwrap();
        assert_eq!(profits[0]["id"], "p2");

        assert_eq!(store.delete_profit("p1").unwrap(), 1);
        assert_eq!(store.delete_expense("e1").unwrap(), 1);
    }

    #[test]
    fn empty_summary_is_zero_not_null() {
        let store = temp_store();
        let summary = store.fetch_profit_summary().unwrap();
        assert_eq!(summary["total_profit"].as_f64(), Some(0.0));
        assert_eq!(summary["net_profit"].as_f64(), Some(0.0));
    }

    #[test]
    fn sessions_roundtrip_and_purge() {
        let store = temp_store();
        store.insert_session("tok1", "admin@example.com", 100.0, 200.0).unwrap();
        store.insert_session("tok2", "admin@example.com", 100.0, 50.0).unwrap();

        let (email, expires) = store.fetch_session("tok1").unwrap().unwrap();
        assert_eq!(email, "admin@example.com");
        assert_eq!(expires, 200.0);

        assert_eq!(store.purge_expired_sessions(100.0).unwrap(), 1);
        assert!(store.fetch_session("tok2").unwrap().is_none());
        assert!(store.fetch_session("tok1").unwrap().is_some());

        assert_eq!(store.delete_session("tok1").unwrap(), 1);
        assert!(store.fetch_session("tok1").unwrap().is_none());
    }

    #[test]
    fn accounts_sort_by_entry_number() {
        let store = temp_store();
        store.upsert_account("a2", Some(2), "Second", None, None, None, None).unwrap();
        store.upsert_account("a1", Some(1), "First", Some("x@y.z"), None, None, None).unwrap();

        let accounts = store.fetch_accounts().unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0]["name"], "First");
        assert_eq!(accounts[1]["name"], "Second");

        assert_eq!(store.delete_account("a1").unwrap(), 1);
        assert_eq!(store.fetch_accounts().unwrap().len(), 1);
    }
}
