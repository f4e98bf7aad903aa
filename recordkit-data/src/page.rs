use serde::{Deserialize, Serialize};

/// Page coordinates of a filter request. Page numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page_number: u64,
    pub page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: 20,
        }
    }
}

impl PageRequest {
    pub fn new(page_number: u64, page_size: u64) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    /// Rows to skip before this page, or `None` when the page number is 0
    /// or the offset overflows.
    pub fn offset(&self) -> Option<u64> {
        self.page_number.checked_sub(1)?.checked_mul(self.page_size)
    }
}

/// One page of mapped rows together with the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult<T> {
    pub count: u64,
    pub list: Vec<T>,
}

impl<T> QueryResult<T> {
    pub fn new(count: u64, list: Vec<T>) -> Self {
        Self { count, list }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_of_second_page() {
        assert_eq!(PageRequest::new(2, 10).offset(), Some(10));
        assert_eq!(PageRequest::new(1, 10).offset(), Some(0));
    }

    #[test]
    fn page_zero_has_no_offset() {
        assert_eq!(PageRequest::new(0, 10).offset(), None);
    }

    #[test]
    fn deserializes_camel_case() {
        let page: PageRequest =
            serde_json::from_str(r#"{"pageNumber":3,"pageSize":25}"#).unwrap();
        assert_eq!(page, PageRequest::new(3, 25));
    }
}
