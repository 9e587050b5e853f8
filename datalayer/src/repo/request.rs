use std::collections::HashMap;

use crate::db::dialect::is_identifier;
use crate::db::query::{Builder, Direction};
use crate::db::value::Value;

/// 查询字符串转换设置 / Query-string translation settings
///
/// 字段白名单为空时不做限制 / an empty allow-list allows everything
#[derive(Debug, Clone)]
pub struct RequestSettings {
    partials: Vec<String>,
    allowed_filters: Vec<String>,
    allowed_sorts: Vec<String>,
    aliases: HashMap<String, String>,
    custom_filters: HashMap<String, HashMap<String, String>>,
    attrs_param: String,
    sort_param: String,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            partials: Vec::new(),
            allowed_filters: Vec::new(),
            allowed_sorts: Vec::new(),
            aliases: HashMap::new(),
            custom_filters: HashMap::new(),
            attrs_param: "attrs".to_string(),
            sort_param: "sort".to_string(),
        }
    }
}

impl RequestSettings {
    pub fn add_partial_search(&mut self, column: &str) {
        if !self.partials.iter().any(|p| p == column) {
            self.partials.push(column.to_string());
        }
    }

    pub fn allowed_filters(&mut self, fields: &[&str]) {
        self.allowed_filters = fields.iter().map(|f| f.to_string()).collect();
    }

    pub fn allowed_sorts(&mut self, fields: &[&str]) {
        self.allowed_sorts = fields.iter().map(|f| f.to_string()).collect();
    }

    /// 参数别名 → 真实列 / Alias a request name to a column
    pub fn refer(&mut self, alias: &str, column: &str) {
        self.aliases.insert(alias.to_string(), column.to_string());
    }

    /// 整体替换自定义过滤器：参数 → 取值 → 原生 SQL
    /// Replace all custom filters: param → value → raw SQL
    pub fn add_custom_filters(&mut self, filters: HashMap<String, HashMap<String, String>>) {
        self.custom_filters = filters;
    }

    pub fn add_custom_filter(&mut self, param: &str, value: &str, sql: &str) {
        self.custom_filters
            .entry(param.to_string())
            .or_default()
            .insert(value.to_string(), sql.to_string());
    }

    pub fn change_attrs_param(&mut self, param: &str) {
        self.attrs_param = param.to_string();
    }

    pub fn change_sort_param(&mut self, param: &str) {
        self.sort_param = param.to_string();
    }

    pub fn attrs_param(&self) -> &str {
        &self.attrs_param
    }

    pub fn sort_param(&self) -> &str {
        &self.sort_param
    }

    fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// 按顺序把请求参数写入构建器 / Apply request parameters to the builder, in order
    ///
    /// `equals` 为等值比较使用的操作符 / `equals` is the operator used for equality
    pub fn apply(&self, builder: &mut Builder, equals: &str, params: &[(String, String)]) {
        for (param, value) in group_list_params(params) {
            if value.is_empty() || param == "page" || param == "per_page" {
                continue;
            }
            if param == self.attrs_param {
                self.select_fields(builder, &value);
                continue;
            }
            if param == self.sort_param {
                self.apply_sorting(builder, &value);
                continue;
            }
            if self.custom_filters.contains_key(param.as_str()) {
                self.apply_custom_filter(builder, &param, &value);
                continue;
            }
            if !self.allowed_filters.is_empty() && !self.allowed_filters.contains(&param) {
                continue;
            }

            let column = self.resolve(&param);
            if !is_identifier(column) {
                tracing::warn!(param = %param, "ignoring filter on invalid column");
                continue;
            }
            let values: Vec<&str> = value.split(',').collect();
            if values.len() > 1 {
                let typed: Vec<Value> = values.iter().map(|v| builder.typed_value(column, v)).collect();
                builder.where_in(column, typed);
            } else if self.partials.iter().any(|p| p == column) {
                builder.where_op(column, "ILIKE", format!("%{}%", value));
            } else {
                let typed = builder.typed_value(column, &value);
                builder.where_op(column, equals, typed);
            }
        }
    }

    /// `a,b,alias` → `SELECT a, b, column AS alias`
    pub fn select_fields(&self, builder: &mut Builder, attributes: &str) {
        let columns: Vec<String> = attributes
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .filter_map(|attr| match self.aliases.get(attr) {
                Some(column) if is_identifier(column) && is_identifier(attr) => {
                    Some(format!("{} AS {}", column, attr))
                }
                None if is_identifier(attr) => Some(attr.to_string()),
                _ => {
                    tracing::warn!(attr, "ignoring invalid attribute");
                    None
                }
            })
            .collect();
        if !columns.is_empty() {
            builder.select(&columns);
        }
    }

    /// `-a,b` → `ORDER BY a DESC, b ASC`
    pub fn apply_sorting(&self, builder: &mut Builder, fields: &str) {
        for field in fields.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            let (name, direction) = match field.strip_prefix('-') {
                Some(rest) => (rest, Direction::Desc),
                None => (field, Direction::Asc),
            };
            if !self.allowed_sorts.is_empty() && !self.allowed_sorts.iter().any(|s| s == name) {
                continue;
            }
            let column = self.resolve(name);
            if !is_identifier(column) {
                tracing::warn!(field = name, "ignoring sort on invalid column");
                continue;
            }
            builder.order_by(column, direction);
        }
    }

    /// 未登记的取值不产生条件 / Unknown values add nothing
    pub fn apply_custom_filter(&self, builder: &mut Builder, param: &str, value: &str) {
        if let Some(sql) = self.custom_filters.get(param).and_then(|m| m.get(value)) {
            builder.where_raw(sql, vec![]);
        }
    }
}

/// 合并 `name[]=a&name[]=b` 为 `name=a,b`，保持首次出现的顺序
/// Fold `name[]=a&name[]=b` into `name=a,b`, keeping first-seen order
fn group_list_params(params: &[(String, String)]) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::with_capacity(params.len());
    for (k, v) in params {
        match k.strip_suffix("[]") {
            Some(name) => match out.iter_mut().find(|(n, _)| n == name) {
                Some((_, existing)) if !existing.is_empty() => {
                    existing.push(',');
                    existing.push_str(v);
                }
                Some((_, existing)) => existing.push_str(v),
                None => out.push((name.to_string(), v.clone())),
            },
            None => out.push((k.clone(), v.clone())),
        }
    }
    out
}
