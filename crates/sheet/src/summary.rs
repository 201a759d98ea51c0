//! Group-by-account share totals.
//!
//! Rows of a header-named [`Sheet`] are grouped on the account column, the
//! share column is summed per group and the groups come out in ascending
//! account order.

use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Name of the single sheet in a summary workbook.
pub const OUTPUT_SHEET_NAME: &str = "Processed Data";

/// Grouping key derived from an account cell.
///
/// `Int` and `Float` cells share the `Number` kind, so `1` and `1.0` land in
/// the same group. Ordering across kinds is `Bool < Number < Date < Text`.
#[derive(Debug, Clone)]
pub enum AccountKey {
    Bool(bool),
    Number(f64),
    Date(NaiveDateTime),
    Text(String),
}

impl AccountKey {
    /// Key for a cell, or `None` for an empty cell.
    #[must_use]
    pub fn from_cell(cell: &CellValue) -> Option<Self> {
        match cell {
            CellValue::Null => None,
            CellValue::Bool(b) => Some(AccountKey::Bool(*b)),
            // adding 0.0 folds -0.0 into 0.0
            CellValue::Int(i) => Some(AccountKey::Number(*i as f64 + 0.0)),
            CellValue::Float(f) => Some(AccountKey::Number(*f + 0.0)),
            CellValue::String(s) => Some(AccountKey::Text(s.clone())),
            CellValue::Date(dt) => Some(AccountKey::Date(*dt)),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            AccountKey::Bool(_) => 0,
            AccountKey::Number(_) => 1,
            AccountKey::Date(_) => 2,
            AccountKey::Text(_) => 3,
        }
    }
}

impl Ord for AccountKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (AccountKey::Bool(a), AccountKey::Bool(b)) => a.cmp(b),
            (AccountKey::Number(a), AccountKey::Number(b)) => a.total_cmp(b),
            (AccountKey::Date(a), AccountKey::Date(b)) => a.cmp(b),
            (AccountKey::Text(a), AccountKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for AccountKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for AccountKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AccountKey {}

impl Hash for AccountKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            AccountKey::Bool(b) => b.hash(state),
            AccountKey::Number(f) => f.to_bits().hash(state),
            AccountKey::Date(dt) => dt.hash(state),
            AccountKey::Text(s) => s.hash(state),
        }
    }
}

/// One output row: an account and its summed share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow {
    /// The account cell as it first appeared in the input.
    pub account: CellValue,
    pub total: f64,
}

/// Summed shares per account, ascending by account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareSummary {
    pub account_column: String,
    pub share_column: String,
    pub rows: Vec<ShareRow>,
}

impl ShareSummary {
    /// Number of distinct accounts
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header row followed by one row per account.
    pub fn to_sheet(&self) -> Result<Sheet> {
        let mut sheet = Sheet::with_name(OUTPUT_SHEET_NAME);
        sheet.row_append(vec![
            CellValue::from(self.account_column.as_str()),
            CellValue::from(self.share_column.as_str()),
        ])?;
        for row in &self.rows {
            sheet.row_append(vec![row.account.clone(), CellValue::Float(row.total)])?;
        }
        Ok(sheet)
    }

    /// Serialize as a single-sheet xlsx workbook.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        self.to_sheet()?.to_xlsx_bytes()
    }
}

/// Group `sheet` by `account_column` and sum `share_column`.
///
/// The sheet's columns must already be named from its header row. Fails with
/// [`SheetError::MissingColumns`] if either column is absent, and with
/// [`SheetError::NonNumericShare`] on the first share cell that is neither a
/// number nor empty; dates count as non-numeric. Rows with an empty account
/// are left out.
pub fn summarize(sheet: &Sheet, account_column: &str, share_column: &str) -> Result<ShareSummary> {
    let missing: Vec<String> = [account_column, share_column]
        .into_iter()
        .filter(|name| !sheet.has_column(name))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(SheetError::MissingColumns { columns: missing });
    }

    let account_idx = sheet.column_index_by_name(account_column)?;
    let share_idx = sheet.column_index_by_name(share_column)?;

    let mut groups: IndexMap<AccountKey, ShareRow> = IndexMap::new();

    for (row_idx, row) in sheet.data_rows() {
        let share_cell = row.get(share_idx).unwrap_or(&CellValue::Null);
        let share = match share_cell {
            CellValue::Null => 0.0,
            cell => cell.as_number().ok_or_else(|| SheetError::NonNumericShare {
                row: sheet.spreadsheet_row(row_idx),
                column: share_column.to_string(),
                value: cell.as_str(),
            })?,
        };

        let account_cell = row.get(account_idx).unwrap_or(&CellValue::Null);
        let Some(key) = AccountKey::from_cell(account_cell) else {
            continue;
        };

        groups
            .entry(key)
            .or_insert_with(|| ShareRow {
                account: account_cell.clone(),
                total: 0.0,
            })
            .total += share;
    }

    groups.sort_unstable_keys();

    Ok(ShareSummary {
        account_column: account_column.to_string(),
        share_column: share_column.to_string(),
        rows: groups.into_values().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn named(rows: Vec<Vec<CellValue>>) -> Sheet {
        let mut sheet = Sheet::new();
        *sheet.data_mut() = rows;
        sheet.name_columns_by_row(0).unwrap();
        sheet
    }

    fn header() -> Vec<CellValue> {
        vec![CellValue::from("acc"), CellValue::from("fr")]
    }

    #[test]
    fn test_key_numbers_unify_int_and_float() {
        let a = AccountKey::from_cell(&CellValue::Int(1)).unwrap();
        let b = AccountKey::from_cell(&CellValue::Float(1.0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_negative_zero() {
        let a = AccountKey::from_cell(&CellValue::Float(-0.0)).unwrap();
        let b = AccountKey::from_cell(&CellValue::Int(0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_order_across_kinds() {
        let mut keys = vec![
            AccountKey::Text("b".into()),
            AccountKey::Number(10.0),
            AccountKey::Bool(true),
            AccountKey::Text("a".into()),
            AccountKey::Number(2.0),
            AccountKey::Bool(false),
            AccountKey::Date(date(2024, 1, 15)),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                AccountKey::Bool(false),
                AccountKey::Bool(true),
                AccountKey::Number(2.0),
                AccountKey::Number(10.0),
                AccountKey::Date(date(2024, 1, 15)),
                AccountKey::Text("a".into()),
                AccountKey::Text("b".into()),
            ]
        );
    }

    #[test]
    fn test_empty_account_rows_are_skipped() {
        let sheet = named(vec![
            header(),
            vec![CellValue::Null, CellValue::Int(100)],
            vec![CellValue::from("x"), CellValue::Int(1)],
        ]);
        let summary = summarize(&sheet, "acc", "fr").unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary.rows[0].account, CellValue::from("x"));
    }

    #[test]
    fn test_empty_share_contributes_nothing() {
        let sheet = named(vec![
            header(),
            vec![CellValue::Int(1), CellValue::Null],
            vec![CellValue::Int(1), CellValue::Float(2.5)],
            vec![CellValue::Int(2), CellValue::Null],
        ]);
        let summary = summarize(&sheet, "acc", "fr").unwrap();
        let totals: Vec<f64> = summary.rows.iter().map(|r| r.total).collect();
        assert_eq!(totals, vec![2.5, 0.0]);
    }

    #[test]
    fn test_non_numeric_share_reports_row() {
        let sheet = named(vec![
            header(),
            vec![CellValue::Int(1), CellValue::Int(3)],
            vec![CellValue::Int(1), CellValue::from("7")],
        ]);
        let err = summarize(&sheet, "acc", "fr").unwrap_err();
        assert!(matches!(
            err,
            SheetError::NonNumericShare { row: 3, ref column, ref value }
                if column == "fr" && value == "7"
        ));
    }

    #[test]
    fn test_boolean_share_is_rejected() {
        let sheet = named(vec![header(), vec![CellValue::Int(1), CellValue::Bool(true)]]);
        assert!(matches!(
            summarize(&sheet, "acc", "fr"),
            Err(SheetError::NonNumericShare { .. })
        ));
    }

    #[test]
    fn test_date_share_is_rejected() {
        let sheet = named(vec![
            header(),
            vec![CellValue::Int(1), CellValue::Date(date(2024, 1, 15))],
        ]);
        let err = summarize(&sheet, "acc", "fr").unwrap_err();
        assert!(matches!(
            err,
            SheetError::NonNumericShare { row: 2, ref value, .. } if value == "2024-01-15"
        ));
        assert!(!err.is_missing_column());
    }

    #[test]
    fn test_date_accounts_group_and_sort() {
        let sheet = named(vec![
            header(),
            vec![CellValue::Date(date(2024, 3, 1)), CellValue::Int(2)],
            vec![CellValue::Date(date(2024, 1, 15)), CellValue::Int(4)],
            vec![CellValue::Date(date(2024, 3, 1)), CellValue::Int(1)],
        ]);
        let summary = summarize(&sheet, "acc", "fr").unwrap();
        assert_eq!(
            summary.rows,
            vec![
                ShareRow { account: CellValue::Date(date(2024, 1, 15)), total: 4.0 },
                ShareRow { account: CellValue::Date(date(2024, 3, 1)), total: 3.0 },
            ]
        );
    }

    #[test]
    fn test_non_numeric_share_in_skipped_row_still_fails() {
        let sheet = named(vec![header(), vec![CellValue::Null, CellValue::from("n/a")]]);
        assert!(summarize(&sheet, "acc", "fr").is_err());
    }

    #[test]
    fn test_missing_columns_lists_both() {
        let sheet = named(vec![header()]);
        let err = summarize(&sheet, "account", "share").unwrap_err();
        assert!(matches!(
            err,
            SheetError::MissingColumns { ref columns } if columns == &vec!["account", "share"]
        ));
    }

    #[test]
    fn test_unnamed_sheet_is_missing_columns() {
        let sheet = Sheet::new();
        assert!(summarize(&sheet, "acc", "fr")
            .unwrap_err()
            .is_missing_column());
    }

    #[test]
    fn test_first_seen_account_cell_is_kept() {
        let sheet = named(vec![
            header(),
            vec![CellValue::Int(5), CellValue::Int(1)],
            vec![CellValue::Float(5.0), CellValue::Int(1)],
        ]);
        let summary = summarize(&sheet, "acc", "fr").unwrap();
        assert_eq!(summary.rows, vec![ShareRow { account: CellValue::Int(5), total: 2.0 }]);
    }

    #[test]
    fn test_to_sheet_layout() {
        let summary = ShareSummary {
            account_column: "acc".into(),
            share_column: "fr".into(),
            rows: vec![ShareRow { account: CellValue::from("a"), total: 4.0 }],
        };
        let sheet = summary.to_sheet().unwrap();
        assert_eq!(sheet.name(), OUTPUT_SHEET_NAME);
        assert_eq!(sheet.row(0).unwrap(), &header());
        assert_eq!(sheet.get(1, 1).unwrap(), &CellValue::Float(4.0));
    }
}
