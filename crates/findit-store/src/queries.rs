use findit_types::models::{Decision, Item, NewItem, Report, ReportStatus, UserRecord};
use tracing::info;

use crate::error::{Result, StoreError};
use crate::{Store, Tables, Touched};

impl Store {
    // -- Users --

    /// Insert a new account with the starting balance.
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<()> {
        self.transact(Touched::Users, |tables| {
            if tables.users.contains_key(username) {
                return Err(StoreError::AlreadyExists(username.to_string()));
            }
            tables
                .users
                .insert(username.to_string(), UserRecord::new(password_hash.to_string()));
            Ok(())
        })?;

        info!("Registered user {}", username);
        Ok(())
    }

    pub fn get_user(&self, username: &str) -> Result<Option<UserRecord>> {
        self.with_tables(|tables| tables.users.get(username).cloned())
    }

    // -- Items --

    /// Append a listing owned by `owner` and return it with its assigned id.
    pub fn create_item(&self, owner: &str, new: NewItem) -> Result<Item> {
        let now = chrono::Utc::now().timestamp();

        let item = self.transact(Touched::Items, |tables| {
            if !tables.users.contains_key(owner) {
                return Err(StoreError::UnknownUser(owner.to_string()));
            }

            let item = Item {
                id: next_item_id(tables, now)?,
                owner: owner.to_string(),
                item: new.item,
                point: new.point,
                characteristic: new.characteristic,
                start_lat: new.start_lat,
                start_lng: new.start_lng,
                lat: new.lat,
                lng: new.lng,
                start_address: new.start_address,
                end_address: new.end_address,
                photo: new.photo,
                reports: Vec::new(),
            };
            tables.items.push(item.clone());
            Ok(item)
        })?;

        info!("Item {} created by {} ({} points)", item.id, owner, item.point);
        Ok(item)
    }

    pub fn list_items(&self) -> Result<Vec<Item>> {
        self.with_tables(|tables| tables.items.clone())
    }

    pub fn items_by_owner(&self, owner: &str) -> Result<Vec<Item>> {
        self.with_tables(|tables| {
            tables
                .items
                .iter()
                .filter(|item| item.owner == owner)
                .cloned()
                .collect()
        })
    }

    // -- Reports --

    /// Record a pending "found it" report. A reporter gets one report per item.
    pub fn submit_report(&self, item_id: i64, reporter: &str) -> Result<()> {
        self.transact(Touched::Items, |tables| {
            let item = find_item_mut(tables, item_id)?;
            if item.reports.iter().any(|r| r.reporter == reporter) {
                return Err(StoreError::AlreadyReported {
                    item_id,
                    reporter: reporter.to_string(),
                });
            }
            item.reports.push(Report::pending(reporter));
            Ok(())
        })?;

        info!("{} reported finding item {}", reporter, item_id);
        Ok(())
    }

    /// Settle a pending report on one of `caller`'s items.
    ///
    /// Accepting moves the item's points from the owner to the reporter (the
    /// owner's balance may go negative) and marks the report `yes`. Rejecting
    /// drops the report. Both files are rewritten; a failed users write
    /// rolls the items file back, leaving the report pending.
    pub fn resolve_report(
        &self,
        item_id: i64,
        caller: &str,
        reporter: &str,
        decision: Decision,
    ) -> Result<()> {
        self.transact(Touched::Both, |tables| {
            let Tables { users, items } = tables;

            let item = items
                .iter_mut()
                .find(|item| item.id == item_id)
                .ok_or(StoreError::ItemNotFound(item_id))?;

            if item.owner != caller {
                return Err(StoreError::Forbidden {
                    item_id,
                    caller: caller.to_string(),
                });
            }

            let pos = item
                .reports
                .iter()
                .position(|r| r.reporter == reporter)
                .ok_or_else(|| StoreError::ReportNotFound {
                    item_id,
                    reporter: reporter.to_string(),
                })?;

            if item.reports[pos].status != ReportStatus::Pending {
                return Err(StoreError::AlreadyResolved {
                    item_id,
                    reporter: reporter.to_string(),
                });
            }

            match decision {
                Decision::Accept => {
                    for name in [reporter, item.owner.as_str()] {
                        if !users.contains_key(name) {
                            return Err(StoreError::UnknownUser(name.to_string()));
                        }
                    }
                    if let Some(user) = users.get_mut(reporter) {
                        user.point += item.point;
                    }
                    if let Some(user) = users.get_mut(&item.owner) {
                        user.point -= item.point;
                    }
                    item.reports[pos].status = ReportStatus::Yes;
                }
                Decision::Reject => {
                    item.reports.remove(pos);
                }
            }
            Ok(())
        })?;

        info!("{} resolved {}'s report on item {}: {:?}", caller, reporter, item_id, decision);
        Ok(())
    }
}

/// Ids look like creation timestamps but never repeat: an item created in
/// the same second as the newest one gets the next integer instead.
fn next_item_id(tables: &Tables, now: i64) -> Result<i64> {
    match tables.items.iter().map(|item| item.id).max() {
        Some(last) if last >= now => last.checked_add(1).ok_or(StoreError::IdsExhausted(last)),
        _ => Ok(now),
    }
}

fn find_item_mut(tables: &mut Tables, item_id: i64) -> Result<&mut Item> {
    tables
        .items
        .iter_mut()
        .find(|item| item.id == item_id)
        .ok_or(StoreError::ItemNotFound(item_id))
}
