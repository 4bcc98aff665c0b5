pub mod error;
pub mod persist;
pub mod queries;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use findit_types::models::{Item, UserRecord};
use tracing::{error, info, warn};

pub use error::{Result, StoreError};

/// The two collections, held in memory and mirrored to disk.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub users: BTreeMap<String, UserRecord>,
    pub items: Vec<Item>,
}

/// Which files a mutation has to rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Touched {
    Users,
    Items,
    Both,
}

/// JSON-file record store. All reads and writes go through one lock.
pub struct Store {
    users_path: PathBuf,
    items_path: PathBuf,
    tables: Mutex<Tables>,
}

impl Store {
    pub fn open(users_path: impl Into<PathBuf>, items_path: impl Into<PathBuf>) -> Result<Self> {
        let users_path = users_path.into();
        let items_path = items_path.into();

        let tables = Tables {
            users: persist::load(&users_path)?,
            items: persist::load(&items_path)?,
        };

        info!(
            "Record store opened: {} users from {}, {} items from {}",
            tables.users.len(),
            users_path.display(),
            tables.items.len(),
            items_path.display()
        );

        Ok(Self {
            users_path,
            items_path,
            tables: Mutex::new(tables),
        })
    }

    pub fn with_tables<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Tables) -> T,
    {
        let tables = self.lock()?;
        Ok(f(&tables))
    }

    /// Apply `f` to a copy of the tables, persist what it touched, then commit.
    ///
    /// If `f` or persistence fails the in-memory tables are left as they were.
    /// Items are written before users; when the users write then fails, the
    /// previous items file is written back so the two files never disagree
    /// about a settled report.
    pub(crate) fn transact<F, T>(&self, touched: Touched, f: F) -> Result<T>
    where
        F: FnOnce(&mut Tables) -> Result<T>,
    {
        let mut tables = self.lock()?;
        let mut draft = tables.clone();
        let out = f(&mut draft)?;

        let items_saved = matches!(touched, Touched::Items | Touched::Both);
        if items_saved {
            persist::save(&draft.items, &self.items_path)?;
        }
        if matches!(touched, Touched::Users | Touched::Both) {
            if let Err(e) = persist::save(&draft.users, &self.users_path) {
                if items_saved {
                    self.restore_items(&tables.items);
                }
                return Err(e);
            }
        }

        *tables = draft;
        Ok(out)
    }

    fn restore_items(&self, items: &[Item]) {
        match persist::save(items, &self.items_path) {
            Ok(()) => warn!("Users write failed; restored {}", self.items_path.display()),
            Err(e) => error!(
                "Users write failed and {} could not be restored: {}",
                self.items_path.display(),
                e
            ),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StoreError::LockPoisoned)
    }
}
