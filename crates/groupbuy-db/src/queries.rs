use crate::Database;
use crate::models::{FormDoc, FormListing, UserRow};
use anyhow::{Context, Result};
use groupbuy_types::models::{FieldConfig, OrderRow};
use rusqlite::Connection;

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, email: &str, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, username, password) VALUES (?1, ?2, ?3, ?4)",
                (id, email, username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Returns false when no such user exists.
    pub fn update_username(&self, id: &str, username: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET username = ?1 WHERE id = ?2",
                (username, id),
            )?;
            Ok(changed > 0)
        })
    }

    pub fn update_password(&self, email: &str, password_hash: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET password = ?1 WHERE email = ?2",
                (password_hash, email),
            )?;
            Ok(changed > 0)
        })
    }

    // -- Forms --

    pub fn create_form(
        &self,
        id: &str,
        owner_id: &str,
        owner_email: &str,
        title: &str,
        description: &str,
        fields: &FieldConfig,
    ) -> Result<()> {
        let fields_json = serde_json::to_string(fields)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO forms (id, owner_id, owner_email, title, description, fields)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (id, owner_id, owner_email, title, description, &fields_json),
            )?;
            Ok(())
        })
    }

    pub fn get_form(&self, id: &str) -> Result<Option<FormDoc>> {
        self.with_conn(|conn| hydrate_form(conn, id))
    }

    pub fn forms_owned_by(&self, owner_id: &str) -> Result<Vec<FormListing>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, owner_id, owner_email, title, description
                 FROM forms WHERE owner_id = ?1 ORDER BY created_at",
            )?;
            let rows = stmt
                .query_map([owner_id], listing_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn forms_viewable_by(&self, email: &str) -> Result<Vec<FormListing>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT f.id, f.owner_id, f.owner_email, f.title, f.description
                 FROM forms f
                 JOIN form_viewers v ON v.form_id = f.id
                 WHERE v.email = ?1
                 ORDER BY f.created_at",
            )?;
            let rows = stmt
                .query_map([email], listing_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_description(&self, form_id: &str, description: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE forms SET description = ?1 WHERE id = ?2",
                (description, form_id),
            )?;
            Ok(changed > 0)
        })
    }

    /// Deleting a form drops its viewer and buyer relations with it
    /// (ON DELETE CASCADE); the rows live inside the document.
    pub fn delete_form(&self, form_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM forms WHERE id = ?1", [form_id])?;
            Ok(changed > 0)
        })
    }

    /// Read-modify-write of a form's row sequence in one serialized step.
    ///
    /// The closure sees the hydrated form and its rows; when it returns
    /// `Ok`, the mutated sequence is written back along with the optional
    /// buyer email to record in the recent-buyers set, otherwise nothing
    /// is persisted. Outer `None` means the form does not exist; the
    /// inner result carries the closure's own outcome.
    pub fn mutate_form_rows<T, E>(
        &self,
        form_id: &str,
        f: impl FnOnce(&FormDoc, &mut Vec<OrderRow>) -> std::result::Result<(T, Option<String>), E>,
    ) -> Result<Option<std::result::Result<T, E>>> {
        self.with_conn(|conn| {
            let Some(form) = hydrate_form(conn, form_id)? else {
                return Ok(None);
            };

            let mut rows = form.rows.clone();
            match f(&form, &mut rows) {
                Ok((out, buyer)) => {
                    let rows_json = serde_json::to_string(&rows)?;
                    conn.execute(
                        "UPDATE forms SET rows = ?1 WHERE id = ?2",
                        (&rows_json, form_id),
                    )?;
                    if let Some(email) = buyer {
                        conn.execute(
                            "INSERT OR IGNORE INTO form_buyers (form_id, email) VALUES (?1, ?2)",
                            (form_id, &email),
                        )?;
                    }
                    Ok(Some(Ok(out)))
                }
                Err(e) => Ok(Some(Err(e))),
            }
        })
    }

    // -- Viewers / recent buyers --

    /// Idempotent add, mirroring a set insert.
    pub fn add_viewer(&self, form_id: &str, email: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO form_viewers (form_id, email) VALUES (?1, ?2)",
                (form_id, email),
            )?;
            Ok(())
        })
    }

    pub fn remove_viewer(&self, form_id: &str, email: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM form_viewers WHERE form_id = ?1 AND email = ?2",
                (form_id, email),
            )?;
            Ok(())
        })
    }

    pub fn recent_buyers(&self, form_id: &str) -> Result<Option<Vec<String>>> {
        self.with_conn(|conn| {
            let exists: bool = conn
                .query_row("SELECT 1 FROM forms WHERE id = ?1", [form_id], |_| Ok(true))
                .optional()?
                .unwrap_or(false);
            if !exists {
                return Ok(None);
            }
            Ok(Some(query_emails(conn, "form_buyers", form_id)?))
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // column is one of the fixed names below, never caller input
    let sql = format!(
        "SELECT id, email, username, password, created_at FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                username: row.get(2)?,
                password: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn listing_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FormListing> {
    Ok(FormListing {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        owner_email: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
    })
}

fn query_emails(conn: &Connection, table: &str, form_id: &str) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT email FROM {} WHERE form_id = ?1 ORDER BY created_at, email",
        table
    );
    let mut stmt = conn.prepare(&sql)?;
    let emails = stmt
        .query_map([form_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(emails)
}

fn hydrate_form(conn: &Connection, id: &str) -> Result<Option<FormDoc>> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, owner_email, title, description, fields, rows
         FROM forms WHERE id = ?1",
    )?;

    let header = stmt
        .query_row([id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })
        .optional()?;

    let Some((id, owner_id, owner_email, title, description, fields_json, rows_json)) = header
    else {
        return Ok(None);
    };

    let fields: FieldConfig = serde_json::from_str(&fields_json)
        .with_context(|| format!("corrupt fields document on form {}", id))?;
    let rows: Vec<OrderRow> = serde_json::from_str(&rows_json)
        .with_context(|| format!("corrupt rows document on form {}", id))?;

    let allowed_viewers = query_emails(conn, "form_viewers", &id)?;
    let recent_buyers = query_emails(conn, "form_buyers", &id)?;

    Ok(Some(FormDoc {
        id,
        owner_id,
        owner_email,
        title,
        description,
        fields,
        rows,
        allowed_viewers,
        recent_buyers,
    }))
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "seller@x.com", "seller", "hash").unwrap();
        db.create_user("u2", "b@x.com", "buyer", "hash").unwrap();
        db.create_form("f1", "u1", "seller@x.com", "tea run", "", &FieldConfig::default().enforce_required())
            .unwrap();
        db
    }

    fn sample_row(id: &str, email: &str) -> OrderRow {
        OrderRow {
            id: id.into(),
            buyer_name: "buyer".into(),
            buyer_email: email.into(),
            item_name: "tea".into(),
            item_qty: 1.0,
            item_price: 2.0,
            item_total: 2.0,
            remittance: false,
            shipped: None,
            shipping_fee: 0.0,
            buyer_social: None,
        }
    }

    #[test]
    fn duplicate_email_rejected_by_store() {
        let db = seeded();
        assert!(db.create_user("u3", "seller@x.com", "dup", "hash").is_err());
    }

    #[test]
    fn form_round_trips_with_relations() {
        let db = seeded();
        db.add_viewer("f1", "b@x.com").unwrap();
        db.add_viewer("f1", "b@x.com").unwrap(); // idempotent

        let form = db.get_form("f1").unwrap().unwrap();
        assert_eq!(form.owner_id, "u1");
        assert_eq!(form.allowed_viewers, vec!["b@x.com".to_string()]);
        assert!(form.recent_buyers.is_empty());
        assert!(form.rows.is_empty());
        assert!(form.fields.0.get("item_total").copied().unwrap_or(false));
    }

    #[test]
    fn mutate_rows_persists_only_on_ok() {
        let db = seeded();

        let out: Option<std::result::Result<usize, ()>> = db
            .mutate_form_rows("f1", |_, rows| {
                rows.push(sample_row("r1", "b@x.com"));
                Ok((rows.len(), None))
            })
            .unwrap();
        assert_eq!(out, Some(Ok(1)));

        // A rejecting closure leaves the stored sequence untouched.
        let out: Option<std::result::Result<(), &str>> = db
            .mutate_form_rows("f1", |_, rows| {
                rows.clear();
                Err("nope")
            })
            .unwrap();
        assert_eq!(out, Some(Err("nope")));

        let form = db.get_form("f1").unwrap().unwrap();
        assert_eq!(form.rows.len(), 1);
        assert_eq!(form.rows[0].id, "r1");
    }

    #[test]
    fn mutate_rows_missing_form() {
        let db = seeded();
        let out: Option<std::result::Result<(), ()>> =
            db.mutate_form_rows("nope", |_, _| Ok(((), None))).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn row_write_and_buyer_record_commit_together() {
        let db = seeded();

        let out: Option<std::result::Result<(), ()>> = db
            .mutate_form_rows("f1", |_, rows| {
                rows.push(sample_row("r1", "b@x.com"));
                Ok(((), Some("b@x.com".to_string())))
            })
            .unwrap();
        assert_eq!(out, Some(Ok(())));
        assert_eq!(
            db.recent_buyers("f1").unwrap(),
            Some(vec!["b@x.com".to_string()])
        );

        // A rejected mutation records neither the row nor the buyer.
        let out: Option<std::result::Result<(), &str>> = db
            .mutate_form_rows("f1", |_, rows| {
                rows.push(sample_row("r2", "c@x.com"));
                Err("nope")
            })
            .unwrap();
        assert_eq!(out, Some(Err("nope")));

        let form = db.get_form("f1").unwrap().unwrap();
        assert_eq!(form.rows.len(), 1);
        assert_eq!(form.recent_buyers, vec!["b@x.com".to_string()]);
    }

    #[test]
    fn viewable_listing_follows_allow_list() {
        let db = seeded();
        db.add_viewer("f1", "b@x.com").unwrap();

        let owned = db.forms_owned_by("u1").unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].title, "tea run");

        let viewable = db.forms_viewable_by("b@x.com").unwrap();
        assert_eq!(viewable.len(), 1);
        db.remove_viewer("f1", "b@x.com").unwrap();
        assert!(db.forms_viewable_by("b@x.com").unwrap().is_empty());
    }

    #[test]
    fn delete_form_drops_relations() {
        let db = seeded();
        db.add_viewer("f1", "b@x.com").unwrap();
        let _: Option<std::result::Result<(), ()>> = db
            .mutate_form_rows("f1", |_, rows| {
                rows.push(sample_row("r1", "b@x.com"));
                Ok(((), Some("b@x.com".to_string())))
            })
            .unwrap();

        assert!(db.delete_form("f1").unwrap());
        assert!(db.get_form("f1").unwrap().is_none());
        assert!(db.forms_viewable_by("b@x.com").unwrap().is_empty());
        assert_eq!(db.recent_buyers("f1").unwrap(), None);
    }

    #[test]
    fn recent_buyers_distinguishes_missing_form() {
        let db = seeded();
        assert_eq!(db.recent_buyers("f1").unwrap(), Some(vec![]));
        assert_eq!(db.recent_buyers("ghost").unwrap(), None);
    }
}
