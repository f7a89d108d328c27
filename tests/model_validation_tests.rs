use chrono::{TimeZone, Utc};
use serde_json::json;
use store_ratings::models::{
    CreateRatingRequest, MAX_RATING, MIN_RATING, MessageResponse, RatingRecord, RatingsResponse,
    Role, StoreSummary,
};

// --- Role ---

#[test]
fn test_role_serializes_snake_case() {
    assert_eq!(serde_json::to_value(Role::Admin).unwrap(), json!("admin"));
    assert_eq!(serde_json::to_value(Role::User).unwrap(), json!("user"));
    assert_eq!(
        serde_json::to_value(Role::StoreOwner).unwrap(),
        json!("store_owner")
    );
}

#[test]
fn test_role_parses_known_values() {
    assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!("user".parse::<Role>().unwrap(), Role::User);
    assert_eq!("store_owner".parse::<Role>().unwrap(), Role::StoreOwner);
    assert_eq!(Role::StoreOwner.to_string(), "store_owner");
}

#[test]
fn test_role_rejects_unknown_values() {
    // Role matching is exact; no case folding.
    for value in ["Admin", "owner", "", "superuser"] {
        let err = value.parse::<Role>().unwrap_err();
        assert_eq!(err.0, value);
    }
    assert!(serde_json::from_value::<Role>(json!("root")).is_err());
}

// --- Response Shapes ---

#[test]
fn test_ratings_response_shape() {
    let response = RatingsResponse {
        ratings: vec![RatingRecord {
            id: 1,
            rating: 5,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            user_name: "Alice".to_string(),
            user_email: "alice@x.com".to_string(),
            store_name: "Corner Shop".to_string(),
        }],
    };

    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(
        value,
        json!({
            "ratings": [{
                "id": 1,
                "rating": 5,
                "created_at": "2024-03-01T12:00:00Z",
                "user_name": "Alice",
                "user_email": "alice@x.com",
                "store_name": "Corner Shop"
            }]
        })
    );
}

#[test]
fn test_unrated_store_has_null_average() {
    let store = StoreSummary {
        id: 4,
        name: "New Place".to_string(),
        owner_id: None,
        average_rating: None,
        rating_count: 0,
    };

    let value = serde_json::to_value(&store).unwrap();

    assert!(value["average_rating"].is_null());
    assert_eq!(value["rating_count"], 0);
}

#[test]
fn test_message_response_omits_empty_field() {
    let plain = serde_json::to_string(&MessageResponse::new("Unauthorized")).unwrap();
    assert_eq!(plain, r#"{"message":"Unauthorized"}"#);

    let with_field = MessageResponse {
        message: "bad".to_string(),
        field: Some("rating".to_string()),
    };
    assert_eq!(
        serde_json::to_value(&with_field).unwrap(),
        json!({ "message": "bad", "field": "rating" })
    );
}

// --- Validation ---

#[test]
fn test_rating_request_bounds() {
    for rating in MIN_RATING..=MAX_RATING {
        assert!(CreateRatingRequest { rating }.is_valid());
    }
    for rating in [i32::MIN, -1, 0, 6, 10, i32::MAX] {
        assert!(!CreateRatingRequest { rating }.is_valid(), "{} accepted", rating);
    }
}

#[test]
fn test_rating_request_rejects_non_integer_payload() {
    assert!(serde_json::from_value::<CreateRatingRequest>(json!({ "rating": "5" })).is_err());
    assert!(serde_json::from_value::<CreateRatingRequest>(json!({ "rating": 4.5 })).is_err());
    assert!(serde_json::from_value::<CreateRatingRequest>(json!({})).is_err());
}
