// SPDX-FileCopyrightText: 2026 Cora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain-table access for the context aggregator and the action executor.
//!
//! The core needs only equality filters, ordering, and limits over these
//! tables; the full CRUD surface belongs to the domain modules that own them.

use cora_core::CoraError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{
    AssistantMode, CalendarEvent, FinanceEntry, FinanceSnapshot, Goal, InboxItem, Reminder,
    Task, UserProfile,
};

/// Create a durable task (action executor target).
pub async fn insert_task(db: &Database, task: &Task) -> Result<(), CoraError> {
    let task = task.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tasks (id, user_id, title, status, priority, due_date, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    task.id,
                    task.user_id,
                    task.title,
                    task.status,
                    task.priority,
                    task.due_date,
                    task.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Pending tasks, oldest first, capped.
pub async fn list_pending_tasks(
    db: &Database,
    user_id: &str,
    limit: usize,
) -> Result<Vec<Task>, CoraError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, title, status, priority, due_date, created_at \
                 FROM tasks WHERE user_id = ?1 AND status = 'pending' \
                 ORDER BY created_at ASC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![user_id, limit as i64], |row| {
                Ok(Task {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    status: row.get(3)?,
                    priority: row.get(4)?,
                    due_date: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })?;
            let mut tasks = Vec::new();
            for row in rows {
                tasks.push(row?);
            }
            Ok(tasks)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Create a capture record (action executor target).
pub async fn insert_inbox_item(db: &Database, item: &InboxItem) -> Result<(), CoraError> {
    let item = item.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO inbox_items (id, user_id, content, processed, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    item.id,
                    item.user_id,
                    item.content,
                    item.processed as i64,
                    item.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a pending reminder placeholder. No scheduling is wired from here.
pub async fn insert_reminder(db: &Database, reminder: &Reminder) -> Result<(), CoraError> {
    let reminder = reminder.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO reminders (id, user_id, content, remind_at, status, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    reminder.id,
                    reminder.user_id,
                    reminder.content,
                    reminder.remind_at,
                    reminder.status,
                    reminder.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a calendar event.
pub async fn insert_event(db: &Database, event: &CalendarEvent) -> Result<(), CoraError> {
    let event = event.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO events (id, user_id, title, starts_at, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![event.id, event.user_id, event.title, event.starts_at, event.created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Events starting inside `[from, to)`, soonest first.
pub async fn list_events_between(
    db: &Database,
    user_id: &str,
    from: &str,
    to: &str,
    limit: usize,
) -> Result<Vec<CalendarEvent>, CoraError> {
    let user_id = user_id.to_string();
    let from = from.to_string();
    let to = to.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, title, starts_at, created_at FROM events \
                 WHERE user_id = ?1 AND starts_at >= ?2 AND starts_at < ?3 \
                 ORDER BY starts_at ASC LIMIT ?4",
            )?;
            let rows = stmt.query_map(params![user_id, from, to, limit as i64], |row| {
                Ok(CalendarEvent {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    starts_at: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?;
            let mut events = Vec::new();
            for row in rows {
                events.push(row?);
            }
            Ok(events)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a goal.
pub async fn insert_goal(db: &Database, goal: &Goal) -> Result<(), CoraError> {
    let goal = goal.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO goals (id, user_id, title, status, progress, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![goal.id, goal.user_id, goal.title, goal.status, goal.progress, goal.created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Active goals, newest first, capped.
pub async fn list_active_goals(
    db: &Database,
    user_id: &str,
    limit: usize,
) -> Result<Vec<Goal>, CoraError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, title, status, progress, created_at FROM goals \
                 WHERE user_id = ?1 AND status = 'active' \
                 ORDER BY created_at DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![user_id, limit as i64], |row| {
                Ok(Goal {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    status: row.get(3)?,
                    progress: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?;
            let mut goals = Vec::new();
            for row in rows {
                goals.push(row?);
            }
            Ok(goals)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a finance entry.
pub async fn insert_finance_entry(db: &Database, entry: &FinanceEntry) -> Result<(), CoraError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO finance_entries (id, user_id, kind, amount_cents, description, occurred_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    entry.id,
                    entry.user_id,
                    entry.kind,
                    entry.amount_cents,
                    entry.description,
                    entry.occurred_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Month-to-date income/expense totals. `month` is a `YYYY-MM` prefix of the
/// RFC3339 `occurred_at` column.
pub async fn finance_month_snapshot(
    db: &Database,
    user_id: &str,
    month: &str,
) -> Result<FinanceSnapshot, CoraError> {
    let user_id = user_id.to_string();
    let pattern = format!("{month}%");
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT kind, COALESCE(SUM(amount_cents), 0) FROM finance_entries \
                 WHERE user_id = ?1 AND occurred_at LIKE ?2 GROUP BY kind",
            )?;
            let rows = stmt.query_map(params![user_id, pattern], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            let mut snapshot = FinanceSnapshot::default();
            for row in rows {
                let (kind, total) = row?;
                match kind.as_str() {
                    "income" => snapshot.income_cents = total,
                    "expense" => snapshot.expense_cents = total,
                    _ => {}
                }
            }
            Ok(snapshot)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a user's profile, if one exists.
pub async fn get_profile(db: &Database, user_id: &str) -> Result<Option<UserProfile>, CoraError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, display_name, timezone, bio FROM user_profiles WHERE user_id = ?1",
            )?;
            let result = stmt.query_row(params![user_id], |row| {
                Ok(UserProfile {
                    user_id: row.get(0)?,
                    display_name: row.get(1)?,
                    timezone: row.get(2)?,
                    bio: row.get(3)?,
                })
            });
            match result {
                Ok(profile) => Ok(Some(profile)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert or replace a user's profile.
pub async fn upsert_profile(db: &Database, profile: &UserProfile) -> Result<(), CoraError> {
    let profile = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO user_profiles (user_id, display_name, timezone, bio) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![profile.user_id, profile.display_name, profile.timezone, profile.bio],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert an assistant mode row.
pub async fn insert_mode(db: &Database, mode: &AssistantMode) -> Result<(), CoraError> {
    let mode = mode.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO assistant_modes (id, user_id, name, description, is_active) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![mode.id, mode.user_id, mode.name, mode.description, mode.is_active as i64],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The user's currently active mode, if any.
pub async fn get_active_mode(
    db: &Database,
    user_id: &str,
) -> Result<Option<AssistantMode>, CoraError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, name, description, is_active FROM assistant_modes \
                 WHERE user_id = ?1 AND is_active = 1 LIMIT 1",
            )?;
            let result = stmt.query_row(params![user_id], |row| {
                Ok(AssistantMode {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    is_active: row.get::<_, i64>(4)? != 0,
                })
            });
            match result {
                Ok(mode) => Ok(Some(mode)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::now_rfc3339;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn task_insert_and_pending_list() {
        let (db, _dir) = setup_db().await;

        let task = Task {
            id: "t1".into(),
            user_id: "user-1".into(),
            title: "Terminar o relatório".into(),
            status: "pending".into(),
            priority: "medium".into(),
            due_date: None,
            created_at: now_rfc3339(),
        };
        insert_task(&db, &task).await.unwrap();

        let mut done = task.clone();
        done.id = "t2".into();
        done.status = "done".into();
        insert_task(&db, &done).await.unwrap();

        let pending = list_pending_tasks(&db, "user-1", 10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "t1");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn events_window_filters_by_range() {
        let (db, _dir) = setup_db().await;

        for (id, starts_at) in [
            ("e1", "2026-03-01T10:00:00+00:00"),
            ("e2", "2026-03-05T10:00:00+00:00"),
            ("e3", "2026-03-20T10:00:00+00:00"),
        ] {
            insert_event(
                &db,
                &CalendarEvent {
                    id: id.into(),
                    user_id: "user-1".into(),
                    title: format!("evento {id}"),
                    starts_at: starts_at.into(),
                    created_at: now_rfc3339(),
                },
            )
            .await
            .unwrap();
        }

        let window = list_events_between(
            &db,
            "user-1",
            "2026-03-01T00:00:00+00:00",
            "2026-03-08T00:00:00+00:00",
            10,
        )
        .await
        .unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].id, "e1");
        assert_eq!(window[1].id, "e2");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn finance_snapshot_sums_by_kind() {
        let (db, _dir) = setup_db().await;

        for (id, kind, cents, when) in [
            ("f1", "income", 500_000, "2026-03-01T00:00:00+00:00"),
            ("f2", "expense", 120_000, "2026-03-02T00:00:00+00:00"),
            ("f3", "expense", 80_000, "2026-03-15T00:00:00+00:00"),
            ("f4", "expense", 999_999, "2026-04-01T00:00:00+00:00"), // next month
        ] {
            insert_finance_entry(
                &db,
                &FinanceEntry {
                    id: id.into(),
                    user_id: "user-1".into(),
                    kind: kind.into(),
                    amount_cents: cents,
                    description: None,
                    occurred_at: when.into(),
                },
            )
            .await
            .unwrap();
        }

        let snap = finance_month_snapshot(&db, "user-1", "2026-03").await.unwrap();
        assert_eq!(snap.income_cents, 500_000);
        assert_eq!(snap.expense_cents, 200_000);
        assert_eq!(snap.balance_cents(), 300_000);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn profile_and_mode_lookup() {
        let (db, _dir) = setup_db().await;

        assert!(get_profile(&db, "user-1").await.unwrap().is_none());

        upsert_profile(
            &db,
            &UserProfile {
                user_id: "user-1".into(),
                display_name: "Rafa".into(),
                timezone: Some("America/Sao_Paulo".into()),
                bio: None,
            },
        )
        .await
        .unwrap();
        let profile = get_profile(&db, "user-1").await.unwrap().unwrap();
        assert_eq!(profile.display_name, "Rafa");

        insert_mode(
            &db,
            &AssistantMode {
                id: "m1".into(),
                user_id: "user-1".into(),
                name: "foco".into(),
                description: Some("respostas curtas".into()),
                is_active: true,
            },
        )
        .await
        .unwrap();
        let mode = get_active_mode(&db, "user-1").await.unwrap().unwrap();
        assert_eq!(mode.name, "foco");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn inbox_and_reminder_inserts() {
        let (db, _dir) = setup_db().await;

        insert_inbox_item(
            &db,
            &InboxItem {
                id: "i1".into(),
                user_id: "user-1".into(),
                content: "ideia para o vídeo".into(),
                processed: false,
                created_at: now_rfc3339(),
            },
        )
        .await
        .unwrap();

        insert_reminder(
            &db,
            &Reminder {
                id: "r1".into(),
                user_id: "user-1".into(),
                content: "pagar a conta de luz".into(),
                remind_at: None,
                status: "pending".into(),
                created_at: now_rfc3339(),
            },
        )
        .await
        .unwrap();

        db.close().await.unwrap();
    }
}
