// ==========================================
// 光伏功率分析系统 - 字段映射器实现
// ==========================================
// 职责: 源列名 → 标准字段映射
// 规则: 1. 列名与标准字段名完全相同（大小写敏感）自动映射，不做模糊匹配
//       2. 其余字段由用户从"未映射源列"中逐个确认
//       3. 已被映射的源列立即移出候选池
// ==========================================

use crate::domain::telemetry::{ColumnMapping, RawTable};
use crate::domain::types::{CanonicalField, REQUIRED_FIELDS};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::telemetry_importer_trait::FieldMapper as FieldMapperTrait;
use tracing::{debug, warn};

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn resolve_mapping(
        &self,
        columns: &[String],
        user_choices: &[(CanonicalField, String)],
    ) -> ImportResult<ColumnMapping> {
        let mut mapping = self.propose_mapping(columns);

        for (field, source) in user_choices {
            if mapping.contains_field(*field) {
                debug!(field = %field, "字段已映射，忽略用户选择");
                continue;
            }
            let candidates = self.candidate_columns(columns, &mapping);
            if !candidates.iter().any(|c| c == source) {
                warn!(field = %field, source = %source, "所选列不在候选池中，忽略");
                continue;
            }
            mapping.assign(*field, source.clone());
            debug!(field = %field, source = %source, "字段映射已确认");
        }

        // 没有时间列无法继续，先于其他缺失字段单独报告
        if !mapping.contains_field(CanonicalField::Time) {
            return Err(ImportError::MissingTimeColumn(
                CanonicalField::Time.label().to_string(),
            ));
        }

        let missing = mapping.missing_fields();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumn(
                missing.iter().map(|f| f.label().to_string()).collect(),
            ));
        }

        Ok(mapping)
    }

    fn apply_mapping(&self, table: &RawTable, mapping: &ColumnMapping) -> RawTable {
        table.with_renamed_columns(&mapping.renames())
    }
}

impl FieldMapper {
    /// 自动映射：列名与标准字段名完全一致的列
    ///
    /// # 返回
    /// - 部分映射（可能缺字段）
    pub fn propose_mapping(&self, columns: &[String]) -> ColumnMapping {
        let mut mapping = ColumnMapping::new();
        for field in REQUIRED_FIELDS {
            if columns.iter().any(|c| c == field.label()) {
                mapping.assign(field, field.label());
            }
        }
        mapping
    }

    /// 可供用户选择的候选列
    ///
    /// 排除: 已被映射的列、列名本身就是标准字段名的列
    pub fn candidate_columns(&self, columns: &[String], mapping: &ColumnMapping) -> Vec<String> {
        columns
            .iter()
            .filter(|c| CanonicalField::from_label(c).is_none())
            .filter(|c| !mapping.is_source_used(c))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::CellValue;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_propose_exact_match_only() {
        let columns = cols(&["Time", "pv(w)", "Meter(W)", "Load (W)"]);
        let mapping = FieldMapper.propose_mapping(&columns);

        assert_eq!(mapping.get(CanonicalField::Time), Some("Time"));
        assert_eq!(mapping.get(CanonicalField::Meter), Some("Meter(W)"));
        assert!(!mapping.contains_field(CanonicalField::Pv));
        assert!(!mapping.contains_field(CanonicalField::Load));
    }

    #[test]
    fn test_resolve_with_user_choices() {
        let columns = cols(&["Time", "inverter", "grid", "site"]);
        let choices = vec![
            (CanonicalField::Pv, "inverter".to_string()),
            (CanonicalField::Meter, "grid".to_string()),
            (CanonicalField::Load, "site".to_string()),
        ];

        let mapping = FieldMapper.resolve_mapping(&columns, &choices).unwrap();
        assert!(mapping.is_complete());
        assert_eq!(mapping.get(CanonicalField::Pv), Some("inverter"));
    }

    #[test]
    fn test_resolve_rejects_double_mapping() {
        let columns = cols(&["Time", "inverter", "grid"]);
        let choices = vec![
            (CanonicalField::Pv, "inverter".to_string()),
            (CanonicalField::Meter, "grid".to_string()),
            // 同一源列不得再映射给 Load
            (CanonicalField::Load, "grid".to_string()),
        ];

        let err = FieldMapper.resolve_mapping(&columns, &choices).unwrap_err();
        match err {
            ImportError::MissingColumn(fields) => assert_eq!(fields, vec!["Load(W)"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_ignores_unknown_column() {
        let columns = cols(&["Time", "PV(W)", "Meter(W)"]);
        let choices = vec![(CanonicalField::Load, "not_there".to_string())];

        let err = FieldMapper.resolve_mapping(&columns, &choices).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(_)));
    }

    #[test]
    fn test_candidates_shrink_after_choice() {
        let columns = cols(&["Time", "a", "b", "PV(W)"]);
        let mut mapping = FieldMapper.propose_mapping(&columns);
        assert_eq!(
            FieldMapper.candidate_columns(&columns, &mapping),
            vec!["a", "b"]
        );

        mapping.assign(CanonicalField::Meter, "a");
        assert_eq!(FieldMapper.candidate_columns(&columns, &mapping), vec!["b"]);
    }

    #[test]
    fn test_missing_time_reported_first() {
        let columns = cols(&["x"]);
        let err = FieldMapper.resolve_mapping(&columns, &[]).unwrap_err();
        assert!(matches!(err, ImportError::MissingTimeColumn(label) if label == "Time"));

        // 时间列已映射后，才报告其余缺失字段
        let choices = vec![(CanonicalField::Time, "x".to_string())];
        match FieldMapper.resolve_mapping(&columns, &choices).unwrap_err() {
            ImportError::MissingColumn(fields) => {
                assert_eq!(fields, vec!["PV(W)", "Meter(W)", "Load(W)"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_apply_mapping_renames() {
        let table = RawTable::new(
            cols(&["ts", "PV(W)", "grid", "site"]),
            vec![vec![CellValue::Empty; 4]],
        );
        let choices = vec![
            (CanonicalField::Time, "ts".to_string()),
            (CanonicalField::Meter, "grid".to_string()),
            (CanonicalField::Load, "site".to_string()),
        ];
        let mapping = FieldMapper
            .resolve_mapping(table.columns(), &choices)
            .unwrap();
        let renamed = FieldMapper.apply_mapping(&table, &mapping);

        assert_eq!(renamed.columns(), &["Time", "PV(W)", "Meter(W)", "Load(W)"]);
    }
}
