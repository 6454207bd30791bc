//! Request scoped transaction.
//!
//! Every controller call runs against one [UnitOfWork]. [UnitOfWork::finish] commits when the
//! call succeeded and rolls back otherwise. Dropping an unfinished unit rolls back as well, so the
//! pooled connection is released on every exit path.

use log::{debug, error};
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

pub struct UnitOfWork {
    pub(crate) txn: DatabaseTransaction,
}

impl UnitOfWork {
    /// Opens a transaction on a pooled connection
    pub async fn begin(db: &DatabaseConnection) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        Ok(UnitOfWork { txn })
    }

    /// Commits on `Ok`, rolls back on `Err` and hands the outcome back.
    ///
    /// A failing commit turns a successful outcome into an error; a failing rollback is only
    /// logged because the original error is the one the caller cares about.
    pub async fn finish<T, E>(self, outcome: Result<T, E>) -> Result<T, E>
    where
        E: From<DbErr>,
    {
        match outcome {
            Ok(value) => {
                self.txn.commit().await?;
                debug!("Unit of work committed.");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.txn.rollback().await {
                    error!("Could not roll back unit of work: {}", rollback_err);
                } else {
                    debug!("Unit of work rolled back.");
                }
                Err(err)
            }
        }
    }
}
