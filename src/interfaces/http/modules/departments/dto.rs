//! Department browsing DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::{BrowseRequest, ColumnInfo, RecordPage};
use crate::domain::ports::{Row, SortDirection, SortSpec};
use crate::shared::PageRequest;

/// Query string for paged record lists
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecordsQuery {
    /// 1-based page number
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Column key to order by; dotted keys order by an embedded table.
    pub sort: Option<String>,
    #[param(value_type = Option<String>, example = "asc")]
    pub direction: Option<SortDirection>,
    /// Case-insensitive text matched against the table's searchable columns.
    pub search: Option<String>,
}

impl RecordsQuery {
    pub fn into_browse(self, default_page_size: u32, max_page_size: u32) -> BrowseRequest {
        BrowseRequest {
            page: PageRequest::new(
                self.page,
                Some(self.page_size.unwrap_or(default_page_size)),
                max_page_size,
            ),
            sort: self
                .sort
                .filter(|s| !s.trim().is_empty())
                .map(|column| SortSpec::new(column.trim(), self.direction.unwrap_or_default())),
            search: self.search,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecordPageDto {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<Row>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl From<RecordPage> for RecordPageDto {
    fn from(page: RecordPage) -> Self {
        Self {
            table: page.table.to_string(),
            columns: page.columns,
            items: page.rows.items,
            total: page.rows.total,
            page: page.rows.page,
            limit: page.rows.limit,
            total_pages: page.rows.total_pages,
        }
    }
}
