use crate::item::{ItemDetail, ItemSummary};

/// Both catalog endpoints wrap their records in `{"data": [...]}`. The details
/// endpoint drops `data` (or nulls it) when it has nothing to say.
#[derive(Debug, PartialEq, serde::Deserialize)]
pub struct DataResponse<D> {
    pub data: Option<Vec<D>>,
}

impl<D> DataResponse<D> {
    pub fn into_data(self) -> Vec<D> {
        self.data.unwrap_or_default()
    }
}

pub type SearchResponse = DataResponse<ItemSummary>;

pub type DetailsResponse = DataResponse<ItemDetail>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_keeps_order() {
        let raw = r#"{
            "data": [
                {"id": 1001, "name": "Newest", "price": 0},
                {"id": 1000, "name": "Older", "price": 50}
            ],
            "nextPageCursor": null
        }"#;
        let data = serde_json::from_str::<SearchResponse>(raw).unwrap().into_data();

        assert_eq!(data.len(), 2);
        assert_eq!(data[0].id.as_str(), "1001");
    }

    #[test]
    fn details_without_data_is_empty() {
        let resp: DetailsResponse = serde_json::from_str(r#"{"errors": []}"#).unwrap();
        assert!(resp.into_data().is_empty());

        let resp: DetailsResponse = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(resp.into_data().is_empty());
    }
}
