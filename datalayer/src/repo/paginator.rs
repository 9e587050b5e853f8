use serde::{Deserialize, Serialize};

use crate::http::pagination::build_link_header;

/// 带总数的分页结果 / Length-aware page of results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginator<T> {
    #[serde(rename = "data")]
    pub items: Vec<T>,
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub last_page: u64,
}

impl<T> Paginator<T> {
    pub fn new(items: Vec<T>, total: u64, per_page: u64, current_page: u64) -> Self {
        let last_page = if per_page == 0 {
            1
        } else {
            total.div_ceil(per_page).max(1)
        };
        Self {
            items,
            total,
            per_page,
            current_page: current_page.max(1),
            last_page,
        }
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paginator<U> {
        Paginator {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            per_page: self.per_page,
            current_page: self.current_page,
            last_page: self.last_page,
        }
    }

    /// `Link` 响应头 / `Link` header value
    pub fn link_header(&self, base_url: &str) -> String {
        build_link_header(base_url, self.current_page, self.per_page, Some(self.total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_math() {
        let p = Paginator::new(vec![1, 2], 95, 30, 2);
        assert_eq!(p.last_page, 4);
        assert!(p.has_more_pages());
        let p = Paginator::<i32>::new(vec![], 0, 50, 0);
        assert_eq!(p.current_page, 1);
        assert_eq!(p.last_page, 1);
        assert!(!p.has_more_pages());
    }

    #[test]
    fn test_serialize_and_link() {
        let p = Paginator::new(vec!["a"], 3, 1, 2).map(|s| s.to_uppercase());
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["data"], serde_json::json!(["A"]));
        assert_eq!(json["last_page"], 3);
        let link = p.link_header("/users");
        assert!(link.contains("rel=\"prev\""));
        assert!(link.contains("page=3&per_page=1>; rel=\"next\""));
    }

    #[test]
    fn test_link_header_past_u32_pages() {
        let p = Paginator::<i32>::new(vec![], 3, 1, 5_000_000_000);
        let link = p.link_header("/users");
        assert!(link.contains("page=4999999999&per_page=1>; rel=\"prev\""), "{}", link);
        assert!(!link.contains("705032703"));
    }
}
