//! Implementation of the database operations

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use log::{info, warn};
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ExecResult, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Schema,
};

use crate::database::models::prelude::{File, FileWeb, ProbeResult, ProbeResultFileWeb, Scan};
use crate::database::models::{file, file_web, probe_result, probe_result_file_web, scan};
use crate::database::service_trait::{DatabaseTrait, FileWebFilter, FileWebRecord};
use crate::database::unit_of_work::UnitOfWork;
use crate::helpers::hash::HashType;

/// Owner of the connection pool. Hands out one [UnitOfWork] per request.
#[derive(Clone)]
pub struct DatabaseImplementation {
    pub db: DatabaseConnection,
}

impl DatabaseImplementation {
    pub async fn begin(&self) -> Result<UnitOfWork, DbErr> {
        UnitOfWork::begin(&self.db).await
    }

    async fn create_table<E: EntityTrait>(&self, entity: E) -> Result<ExecResult, DbErr> {
        let builder = self.db.get_database_backend();
        let schema = Schema::new(builder);
        let mut statement = schema.create_table_from_entity(entity);
        statement.if_not_exists();
        self.db.execute(builder.build(&statement)).await
    }

    fn indexes() -> Vec<IndexCreateStatement> {
        vec![
            Index::create()
                .name("idx-files-sha1")
                .table(File)
                .col(file::Column::Sha1)
                .if_not_exists()
                .to_owned(),
            Index::create()
                .name("idx-files-md5")
                .table(File)
                .col(file::Column::Md5)
                .if_not_exists()
                .to_owned(),
            Index::create()
                .name("idx-filewebs-scan-idx")
                .table(FileWeb)
                .col(file_web::Column::ScanId)
                .col(file_web::Column::ScanFileIdx)
                .unique()
                .if_not_exists()
                .to_owned(),
        ]
    }

    /// Creates database tables and indexes if not existent.
    ///
    /// Index failures are only logged: some backends do not know `IF NOT EXISTS` for indexes
    /// and report the already existing index on every start.
    pub async fn create_tables(&self) -> Result<(), DbErr> {
        self.create_table(Scan).await?;
        self.create_table(File).await?;
        self.create_table(FileWeb).await?;
        self.create_table(ProbeResult).await?;
        self.create_table(ProbeResultFileWeb).await?;

        let builder = self.db.get_database_backend();
        for index in Self::indexes() {
            if let Err(err) = self.db.execute(builder.build(&index)).await {
                warn!("Could not create index! Error: {}", err);
            }
        }
        info!("Database tables are set up.");
        Ok(())
    }
}

fn apply_filter<Q: QueryFilter>(query: Q, filter: &FileWebFilter) -> Q {
    match filter {
        FileWebFilter::Name(name) => query.filter(file_web::Column::Name.contains(name.as_str())),
        FileWebFilter::Hash(HashType::Md5, value) => {
            query.filter(file::Column::Md5.eq(value.as_str()))
        }
        FileWebFilter::Hash(HashType::Sha1, value) => {
            query.filter(file::Column::Sha1.eq(value.as_str()))
        }
        FileWebFilter::Hash(HashType::Sha256, value) => {
            query.filter(file::Column::Sha256.eq(value.as_str()))
        }
    }
}

impl UnitOfWork {
    /// Attaches the owning scan id and the probe results to joined FileWeb rows.
    async fn to_records(
        &self,
        rows: Vec<(file_web::Model, Option<file::Model>)>,
    ) -> Result<Vec<FileWebRecord>, DbErr> {
        let scan_ids: BTreeSet<i32> = rows.iter().map(|(file_web, _)| file_web.scan_id).collect();
        let external_ids: HashMap<i32, String> = if scan_ids.is_empty() {
            HashMap::new()
        } else {
            Scan::find()
                .filter(scan::Column::Id.is_in(scan_ids))
                .all(&self.txn)
                .await?
                .into_iter()
                .map(|scan| (scan.id, scan.external_id))
                .collect()
        };

        let mut records = Vec::with_capacity(rows.len());
        for (file_web, file) in rows {
            let Some(file) = file else {
                warn!("FileWeb with id: {} has no file attached, skipped.", file_web.id);
                continue;
            };
            let probe_results = file_web
                .find_related(ProbeResult)
                .order_by_asc(probe_result::Column::Id)
                .all(&self.txn)
                .await?;
            records.push(FileWebRecord {
                scan_id: external_ids
                    .get(&file_web.scan_id)
                    .cloned()
                    .unwrap_or_default(),
                file_web,
                file,
                probe_results,
            });
        }
        Ok(records)
    }
}

#[async_trait]
impl DatabaseTrait for UnitOfWork {
    // Scan operations
    async fn insert_scan(&self, scan: scan::ActiveModel) -> Result<scan::Model, DbErr> {
        scan.insert(&self.txn).await
    }

    async fn get_scan_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<scan::Model>, DbErr> {
        Scan::find()
            .filter(scan::Column::ExternalId.eq(external_id))
            .one(&self.txn)
            .await
    }

    async fn update_scan(&self, scan: scan::ActiveModel) -> Result<scan::Model, DbErr> {
        scan.update(&self.txn).await
    }

    // File operations
    async fn get_file_by_sha256(&self, sha256: &str) -> Result<Option<file::Model>, DbErr> {
        File::find()
            .filter(file::Column::Sha256.eq(sha256))
            .one(&self.txn)
            .await
    }

    async fn insert_file(&self, file: file::ActiveModel) -> Result<file::Model, DbErr> {
        file.insert(&self.txn).await
    }

    async fn update_file(&self, file: file::ActiveModel) -> Result<file::Model, DbErr> {
        file.update(&self.txn).await
    }

    // FileWeb operations
    async fn insert_file_web(
        &self,
        file_web: file_web::ActiveModel,
    ) -> Result<file_web::Model, DbErr> {
        file_web.insert(&self.txn).await
    }

    async fn count_file_webs_of_scan(&self, scan_id: i32) -> Result<u64, DbErr> {
        FileWeb::find()
            .filter(file_web::Column::ScanId.eq(scan_id))
            .count(&self.txn)
            .await
    }

    async fn get_file_webs_of_scan(
        &self,
        scan: &scan::Model,
    ) -> Result<Vec<FileWebRecord>, DbErr> {
        let rows = FileWeb::find()
            .find_also_related(File)
            .filter(file_web::Column::ScanId.eq(scan.id))
            .order_by_asc(file_web::Column::ScanFileIdx)
            .all(&self.txn)
            .await?;
        self.to_records(rows).await
    }

    async fn get_file_web_of_scan(
        &self,
        scan: &scan::Model,
        scan_file_idx: i32,
    ) -> Result<Option<FileWebRecord>, DbErr> {
        let row = FileWeb::find()
            .find_also_related(File)
            .filter(file_web::Column::ScanId.eq(scan.id))
            .filter(file_web::Column::ScanFileIdx.eq(scan_file_idx))
            .one(&self.txn)
            .await?;
        match row {
            None => Ok(None),
            Some(row) => Ok(self.to_records(vec![row]).await?.pop()),
        }
    }

    // ProbeResult operations
    async fn insert_pending_probe_result(
        &self,
        file_web: &file_web::Model,
        probe_name: &str,
    ) -> Result<probe_result::Model, DbErr> {
        let result = probe_result::ActiveModel {
            id: NotSet,
            name: Set(probe_name.to_string()),
            probe_type: Set(None),
            status: Set(None),
            results: Set(None),
            file_id: Set(file_web.file_id),
        }
        .insert(&self.txn)
        .await?;

        ProbeResultFileWeb::insert(probe_result_file_web::ActiveModel {
            file_web_id: Set(file_web.id),
            probe_result_id: Set(result.id),
        })
        .exec_without_returning(&self.txn)
        .await?;
        Ok(result)
    }

    // Search operations
    async fn find_file_webs(
        &self,
        filter: &FileWebFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<FileWebRecord>, DbErr> {
        let rows = apply_filter(FileWeb::find().find_also_related(File), filter)
            .order_by_asc(file_web::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.txn)
            .await?;
        self.to_records(rows).await
    }

    async fn count_file_webs(&self, filter: &FileWebFilter) -> Result<u64, DbErr> {
        apply_filter(FileWeb::find().inner_join(File), filter)
            .count(&self.txn)
            .await
    }
}
