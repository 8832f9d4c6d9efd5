//! Preset data frame of geographic coordinates mentioned in a conversation.

use lore_core::query::{SearchTermGroup, TextRange};
use lore_core::LoreResult;

use crate::schema::{DataFrameColumnDef, DataFrameSchema};
use crate::store::FrameStore;
use crate::table::DataFrameTable;
use crate::value::{DataFrameRow, DataFrameSourceRef};

pub const GEO_TABLE: &str = "geo";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";

/// Coordinates are kept as the text that was extracted, so a query for
/// `"47.6"` matches exactly what was said.
pub fn geo_schema() -> DataFrameSchema {
    DataFrameSchema::new()
        .column(LATITUDE, DataFrameColumnDef::string().indexed())
        .column(LONGITUDE, DataFrameColumnDef::string().indexed())
}

#[derive(Clone)]
pub struct GeoTable {
    table: DataFrameTable,
}

impl GeoTable {
    pub async fn create(store: &FrameStore) -> LoreResult<Self> {
        Self::create_named(store, GEO_TABLE).await
    }

    pub async fn create_named(store: &FrameStore, name: &str) -> LoreResult<Self> {
        let table = store.create_table(name, geo_schema()).await?;
        Ok(Self { table })
    }

    pub async fn add_location(
        &self,
        range: TextRange,
        latitude: &str,
        longitude: &str,
    ) -> LoreResult<()> {
        let row = DataFrameRow::new(DataFrameSourceRef::new(range))
            .with(LATITUDE, latitude)
            .with(LONGITUDE, longitude);
        self.table.add_rows(&[row]).await.map(|_| ())
    }

    pub async fn find_sources(
        &self,
        group: &SearchTermGroup,
    ) -> LoreResult<Vec<DataFrameSourceRef>> {
        self.table.find_sources(group).await
    }

    pub fn table(&self) -> &DataFrameTable {
        &self.table
    }

    pub fn into_table(self) -> DataFrameTable {
        self.table
    }
}
