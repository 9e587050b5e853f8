/// SQL 方言 / SQL dialect
///
/// 只处理构建器用到的差异：占位符、标识符引用、LIKE 运算符、RETURNING
/// Only the differences the builder needs: placeholders, quoting, LIKE, RETURNING
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    /// 按连接 URL 识别方言 / Detect dialect from a connection URL
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split(':').next().unwrap_or("").to_ascii_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "mysql" | "mariadb" => Some(Dialect::MySql),
            "sqlite" => Some(Dialect::Sqlite),
            _ => None,
        }
    }

    /// 第 `index` 个占位符（从 1 开始）/ Placeholder for the 1-based `index`
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::MySql | Dialect::Sqlite => "?".to_string(),
        }
    }

    /// 不区分大小写的 LIKE / Case-insensitive LIKE operator
    pub fn like_operator(&self) -> &'static str {
        match self {
            Dialect::Postgres => "ILIKE",
            Dialect::MySql | Dialect::Sqlite => "LIKE",
        }
    }

    pub fn supports_returning(&self) -> bool {
        !matches!(self, Dialect::MySql)
    }

    /// 转为浮点：`Any` 驱动无法解码 NUMERIC/DECIMAL
    /// Cast to a float; the `Any` driver cannot decode NUMERIC/DECIMAL
    pub fn float_cast(&self, expr: &str) -> String {
        let ty = match self {
            Dialect::Postgres => "DOUBLE PRECISION",
            Dialect::MySql => "DOUBLE",
            Dialect::Sqlite => "REAL",
        };
        format!("CAST({} AS {})", expr, ty)
    }

    fn quote_char(&self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Postgres | Dialect::Sqlite => '"',
        }
    }

    /// 引用标识符 / Quote an identifier
    ///
    /// `table.column` 逐段引用；`*` 与表达式原样输出；`expr AS alias` 只引用别名
    /// `table.column` is quoted per part; `*` and expressions pass through;
    /// `expr AS alias` quotes both sides when they are plain identifiers
    pub fn quote(&self, ident: &str) -> String {
        let trimmed = ident.trim();
        if let Some((expr, alias)) = split_alias(trimmed) {
            return format!("{} AS {}", self.quote(expr), self.quote(alias));
        }
        if !is_identifier(trimmed) {
            return trimmed.to_string();
        }
        let q = self.quote_char();
        trimmed
            .split('.')
            .map(|part| {
                if part == "*" {
                    part.to_string()
                } else {
                    format!("{q}{part}{q}")
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// 是否为普通标识符（可带一个表名前缀或 `table.*`）
/// Plain identifier, optionally qualified by one table name or `table.*`
pub fn is_identifier(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.is_empty() || parts.len() > 2 {
        return false;
    }
    parts.iter().enumerate().all(|(i, p)| {
        if i == 1 && *p == "*" {
            return true;
        }
        let mut chars = p.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

fn split_alias(s: &str) -> Option<(&str, &str)> {
    let lower = s.to_ascii_lowercase();
    let idx = lower.find(" as ")?;
    let (expr, alias) = (s[..idx].trim(), s[idx + 4..].trim());
    if is_identifier(expr) && is_identifier(alias) {
        Some((expr, alias))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url() {
        assert_eq!(
            Dialect::from_url("postgres://u:p@localhost/db"),
            Some(Dialect::Postgres)
        );
        assert_eq!(Dialect::from_url("mysql://root@localhost/db"), Some(Dialect::MySql));
        assert_eq!(Dialect::from_url("sqlite::memory:"), Some(Dialect::Sqlite));
        assert_eq!(Dialect::from_url("redis://localhost"), None);
    }

    #[test]
    fn test_quote() {
        let pg = Dialect::Postgres;
        assert_eq!(pg.quote("name"), "\"name\"");
        assert_eq!(pg.quote("users.name"), "\"users\".\"name\"");
        assert_eq!(pg.quote("users.*"), "\"users\".*");
        assert_eq!(pg.quote("*"), "*");
        assert_eq!(pg.quote("COUNT(*) AS total"), "COUNT(*) AS total");
        assert_eq!(pg.quote("email AS mail"), "\"email\" AS \"mail\"");
        assert_eq!(Dialect::MySql.quote("name"), "`name`");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Dialect::Postgres.placeholder(3), "$3");
        assert_eq!(Dialect::Sqlite.placeholder(3), "?");
        assert_eq!(Dialect::Postgres.like_operator(), "ILIKE");
        assert_eq!(Dialect::MySql.like_operator(), "LIKE");
        assert_eq!(Dialect::Sqlite.float_cast("SUM(x)"), "CAST(SUM(x) AS REAL)");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("created_at"));
        assert!(is_identifier("u.id"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("name; DROP TABLE users"));
        assert!(!is_identifier("a.b.c"));
        assert!(!is_identifier(""));
    }
}
