mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, ErrorCode, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::models::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Setting keys remembered per profile between runs.
pub(crate) const SETTING_INCOME: &str = "income";
pub(crate) const SETTING_STRATEGY: &str = "strategy";
pub(crate) const SETTING_MONTHLY_PAYMENT: &str = "monthly_payment";

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        db.seed_default_categories()?;
        info!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_categories()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            info!(version = schema::CURRENT_VERSION, "creating schema");
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                info!(from_version, "applying migration");
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    fn seed_default_categories(&mut self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let defaults = [
            "Auto Payment",
            "Childcare",
            "Credit Card Payment",
            "Education",
            "Entertainment",
            "Financial",
            "Food & Dining",
            "Gas & Fuel",
            "Gifts & Donations",
            "Groceries",
            "Health & Fitness",
            "Insurance",
            "Miscellaneous",
            "Personal Care",
            "Pets",
            "Phone & Internet",
            "Rent/Mortgage",
            "Shopping",
            "Student Loan Payment",
            "Subscriptions",
            "Transportation",
            "Travel",
            "Utilities",
        ];

        let tx = self.conn.transaction()?;
        for name in &defaults {
            tx.execute(
                "INSERT OR IGNORE INTO categories (name) VALUES (?1)",
                params![name],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Profiles ──────────────────────────────────────────────

    /// Look up a profile by name, creating it on first use.
    pub(crate) fn ensure_profile(&self, name: &str) -> Result<ProfileId> {
        self.conn.execute(
            "INSERT OR IGNORE INTO profiles (name, created_at) VALUES (?1, ?2)",
            params![name, chrono::Utc::now().to_rfc3339()],
        )?;
        let id: i64 = self.conn.query_row(
            "SELECT id FROM profiles WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        debug!(profile = name, id, "profile resolved");
        Ok(ProfileId(id))
    }

    // ── Debts ─────────────────────────────────────────────────

    pub(crate) fn insert_debt(&self, profile: ProfileId, input: &DebtInput) -> Result<Debt> {
        let today = chrono::Local::now().date_naive();
        let balance = round2(input.current_balance);
        let minimum = round2(input.minimum_payment);
        let result = self.conn.execute(
            "INSERT INTO debts (profile_id, name, lender, current_balance, interest_rate, minimum_payment, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                profile.0,
                input.name,
                input.lender,
                balance.to_string(),
                input.interest_rate.to_string(),
                minimum.to_string(),
                today.format(DATE_FORMAT).to_string(),
            ],
        );
        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                anyhow::bail!("Debt name '{}' already exists", input.name);
            }
            Err(e) => return Err(e.into()),
        }

        let id = self.conn.last_insert_rowid();
        info!(profile = %profile, id, name = %input.name, "debt added");
        Ok(Debt {
            id,
            name: input.name.clone(),
            lender: input.lender.clone(),
            current_balance: balance,
            interest_rate: input.interest_rate,
            minimum_payment: minimum,
            last_updated: today,
        })
    }

    /// All debts for a profile, ordered by name.
    pub(crate) fn get_debts(&self, profile: ProfileId) -> Result<Vec<Debt>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, lender, current_balance, interest_rate, minimum_payment, last_updated
             FROM debts WHERE profile_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![profile.0], debt_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_debt_by_id(&self, profile: ProfileId, id: DebtId) -> Result<Option<Debt>> {
        let result = self.conn.query_row(
            "SELECT id, name, lender, current_balance, interest_rate, minimum_payment, last_updated
             FROM debts WHERE id = ?1 AND profile_id = ?2",
            params![id, profile.0],
            debt_from_row,
        );
        match result {
            Ok(d) => Ok(Some(d)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns false when no such debt exists for the profile.
    pub(crate) fn update_debt(
        &self,
        profile: ProfileId,
        id: DebtId,
        update: &DebtUpdate,
    ) -> Result<bool> {
        let today = chrono::Local::now()
            .date_naive()
            .format(DATE_FORMAT)
            .to_string();
        let balance = round2(update.current_balance).to_string();
        let rate = update.interest_rate.to_string();
        let minimum = round2(update.minimum_payment).to_string();

        let rows = match &update.lender {
            Some(lender) => {
                let lender = Some(lender.trim()).filter(|l| !l.is_empty());
                self.conn.execute(
                    "UPDATE debts SET current_balance = ?1, interest_rate = ?2, minimum_payment = ?3,
                            lender = ?4, last_updated = ?5
                     WHERE id = ?6 AND profile_id = ?7",
                    params![balance, rate, minimum, lender, today, id, profile.0],
                )?
            }
            None => self.conn.execute(
                "UPDATE debts SET current_balance = ?1, interest_rate = ?2, minimum_payment = ?3,
                        last_updated = ?4
                 WHERE id = ?5 AND profile_id = ?6",
                params![balance, rate, minimum, today, id, profile.0],
            )?,
        };
        if rows > 0 {
            info!(profile = %profile, id, "debt updated");
        }
        Ok(rows > 0)
    }

    /// Returns false when no such debt exists for the profile.
    pub(crate) fn delete_debt(&self, profile: ProfileId, id: DebtId) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM debts WHERE id = ?1 AND profile_id = ?2",
            params![id, profile.0],
        )?;
        if rows > 0 {
            info!(profile = %profile, id, "debt removed");
        }
        Ok(rows > 0)
    }

    pub(crate) fn total_minimum_debt_payments(&self, profile: ProfileId) -> Result<Decimal> {
        Ok(Debt::total_minimums(&self.get_debts(profile)?))
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn get_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: Some(row.get(0)?),
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn insert_category(&self, cat: &Category) -> Result<i64> {
        self.conn
            .execute("INSERT INTO categories (name) VALUES (?1)", params![cat.name])
            .with_context(|| format!("Failed to create category '{}'", cat.name))?;
        Ok(self.conn.last_insert_rowid())
    }

    // ── Budgets ───────────────────────────────────────────────

    /// Budget limits joined with category names, ordered by category name.
    pub(crate) fn get_budget_entries(&self, profile: ProfileId) -> Result<Vec<BudgetEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT b.id, b.category_id, c.name, b.monthly_limit
             FROM budgets b JOIN categories c ON c.id = b.category_id
             WHERE b.profile_id = ?1
             ORDER BY c.name",
        )?;
        let rows = stmt.query_map(params![profile.0], |row| {
            Ok(BudgetEntry {
                id: Some(row.get(0)?),
                category_id: row.get(1)?,
                category_name: row.get(2)?,
                monthly_limit: decimal_column(row, 3)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Set a category's monthly limit. Limits are stored at cents, never negative.
    pub(crate) fn upsert_budget(
        &self,
        profile: ProfileId,
        category_id: i64,
        limit: Decimal,
    ) -> Result<Decimal> {
        let limit = round2(limit).max(Decimal::ZERO);
        self.conn.execute(
            "INSERT INTO budgets (profile_id, category_id, monthly_limit)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(profile_id, category_id) DO UPDATE SET monthly_limit = ?3",
            params![profile.0, category_id, limit.to_string()],
        )?;
        info!(profile = %profile, category_id, %limit, "budget set");
        Ok(limit)
    }

    pub(crate) fn delete_budget(&self, profile: ProfileId, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM budgets WHERE id = ?1 AND profile_id = ?2",
            params![id, profile.0],
        )?;
        if rows > 0 {
            info!(profile = %profile, id, "budget removed");
        }
        Ok(rows > 0)
    }

    pub(crate) fn total_budgeted_expenses(&self, profile: ProfileId) -> Result<Decimal> {
        Ok(BudgetEntry::total(&self.get_budget_entries(profile)?))
    }

    // ── Settings ──────────────────────────────────────────────

    pub(crate) fn get_setting(&self, profile: ProfileId, key: &str) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT value FROM settings WHERE profile_id = ?1 AND key = ?2",
            params![profile.0, key],
            |row| row.get(0),
        );
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn set_setting(&self, profile: ProfileId, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (profile_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(profile_id, key) DO UPDATE SET value = ?3",
            params![profile.0, key, value],
        )?;
        Ok(())
    }

    /// A stored decimal setting; unparseable values read as absent.
    pub(crate) fn get_decimal_setting(&self, profile: ProfileId, key: &str) -> Result<Option<Decimal>> {
        Ok(self
            .get_setting(profile, key)?
            .and_then(|v| Decimal::from_str(&v).ok()))
    }
}

fn debt_from_row(row: &Row<'_>) -> rusqlite::Result<Debt> {
    let date_str: String = row.get(6)?;
    let last_updated = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Debt {
        id: row.get(0)?,
        name: row.get(1)?,
        lender: row.get(2)?,
        current_balance: round2(decimal_column(row, 3)?),
        interest_rate: decimal_column(row, 4)?,
        minimum_payment: round2(decimal_column(row, 5)?),
        last_updated,
    })
}

fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
