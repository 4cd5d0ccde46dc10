mod common;

use actix_web::test;

use common::{location, TestApp};

async fn body_text(resp: actix_web::dev::ServiceResponse) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

fn edit_form(city: &str, days: &str) -> Vec<(&'static str, String)> {
    vec![
        ("city", city.to_string()),
        ("days", days.to_string()),
        ("interests", "palaces, lakes ,boat rides".to_string()),
        ("transport", "Taxi".to_string()),
        ("budget", "Luxury".to_string()),
        ("group_type", "Friends".to_string()),
    ]
}

#[actix_web::test]
async fn test_my_trips_empty_state() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let cookie = test_app.open_session();

    let req = test::TestRequest::get()
        .uri("/my-trips")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert!(body_text(resp).await.contains("No saved trips yet."));
}

#[actix_web::test]
async fn test_my_trips_lists_saved_trips_in_order() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let cookie = test_app.open_session();
    test_app.seed_trips(&cookie, &["Udaipur", "Kochi"]);

    let req = test::TestRequest::get()
        .uri("/my-trips")
        .cookie(cookie)
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;

    let udaipur = body.find("Udaipur").expect("first trip listed");
    let kochi = body.find("Kochi").expect("second trip listed");
    assert!(udaipur < kochi);
    assert!(body.contains("href=\"/trip/1\""));
    assert!(body.contains("href=\"/delete-trip/0\""));
}

#[actix_web::test]
async fn test_view_trip_out_of_range_redirects() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let cookie = test_app.open_session();
    test_app.seed_trips(&cookie, &["Udaipur"]);

    let req = test::TestRequest::get()
        .uri("/trip/1")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp).as_deref(), Some("/my-trips"));

    let req = test::TestRequest::get()
        .uri("/my-trips")
        .cookie(cookie)
        .to_request();
    assert!(body_text(test::call_service(&app, req).await)
        .await
        .contains("Trip not found"));
}

#[actix_web::test]
async fn test_negative_or_text_id_is_not_routed() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    for uri in ["/trip/-1", "/trip/abc", "/delete-trip/-1"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404, "{}", uri);
    }
}

#[actix_web::test]
async fn test_edit_form_is_prefilled() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let cookie = test_app.open_session();
    test_app.seed_trips(&cookie, &["Udaipur"]);

    let req = test::TestRequest::get()
        .uri("/edit-trip/0")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    let body = body_text(resp).await;
    assert!(body.contains("action=\"/edit-trip/0\""));
    assert!(body.contains("value=\"Udaipur\""));
    assert!(body.contains("value=\"history, food\""));
}

#[actix_web::test]
async fn test_edit_trip_updates_record() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let cookie = test_app.open_session();
    test_app.seed_trips(&cookie, &["Udaipur", "Kochi"]);
    let original = test_app.saved_trips(&cookie);

    let req = test::TestRequest::post()
        .uri("/edit-trip/1")
        .cookie(cookie.clone())
        .set_form(edit_form("Alleppey", "5"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp).as_deref(), Some("/trip/1"));

    let trips = test_app.saved_trips(&cookie);
    assert_eq!(trips.len(), 2);
    assert_eq!(trips[0], original[0]);
    let edited = &trips[1];
    assert_eq!(edited.params.city, "Alleppey");
    assert_eq!(edited.params.days, 5);
    assert_eq!(edited.params.interests, vec!["palaces", "lakes", "boat rides"]);
    assert_eq!(edited.params.group_type, "Friends");
    assert_eq!(edited.itinerary, original[1].itinerary);
    assert_eq!(edited.created_at, original[1].created_at);
    assert!(edited.updated_at.is_some());

    let req = test::TestRequest::get()
        .uri("/trip/1")
        .cookie(cookie)
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Trip updated successfully!"));
    assert!(body.contains("<dd class=\"trip-city\">Alleppey</dd>"));
    assert!(body.contains("<dt>Updated</dt>"));
}

#[actix_web::test]
async fn test_edit_trip_out_of_range_leaves_list_unchanged() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let cookie = test_app.open_session();
    test_app.seed_trips(&cookie, &["Udaipur"]);
    let before = test_app.saved_trips(&cookie);

    for uri in ["/edit-trip/1", "/edit-trip/7"] {
        let req = test::TestRequest::post()
            .uri(uri)
            .cookie(cookie.clone())
            .set_form(edit_form("Nowhere", "2"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 302);
        assert_eq!(location(&resp).as_deref(), Some("/my-trips"));
    }

    let req = test::TestRequest::get()
        .uri("/edit-trip/3")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp).as_deref(), Some("/my-trips"));

    assert_eq!(test_app.saved_trips(&cookie), before);
}

#[actix_web::test]
async fn test_edit_trip_out_of_range_checked_before_form() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let cookie = test_app.open_session();
    test_app.seed_trips(&cookie, &["Udaipur"]);
    let before = test_app.saved_trips(&cookie);

    let req = test::TestRequest::post()
        .uri("/edit-trip/5")
        .cookie(cookie.clone())
        .set_form([("city", "Nowhere")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp).as_deref(), Some("/my-trips"));
    assert_eq!(test_app.saved_trips(&cookie), before);

    let req = test::TestRequest::get()
        .uri("/my-trips")
        .cookie(cookie.clone())
        .to_request();
    assert!(body_text(test::call_service(&app, req).await)
        .await
        .contains("Trip not found"));

    // An in-range index with the same partial body is a malformed form.
    let req = test::TestRequest::post()
        .uri("/edit-trip/0")
        .cookie(cookie.clone())
        .set_form([("city", "Nowhere")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(test_app.saved_trips(&cookie), before);
}

#[actix_web::test]
async fn test_edit_trip_rejects_zero_days() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let cookie = test_app.open_session();
    test_app.seed_trips(&cookie, &["Udaipur"]);
    let before = test_app.saved_trips(&cookie);

    let req = test::TestRequest::post()
        .uri("/edit-trip/0")
        .cookie(cookie.clone())
        .set_form(edit_form("Udaipur", "0"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp).as_deref(), Some("/edit-trip/0"));
    assert_eq!(test_app.saved_trips(&cookie), before);
}

#[actix_web::test]
async fn test_edit_trip_non_numeric_days_is_bad_request() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let cookie = test_app.open_session();
    test_app.seed_trips(&cookie, &["Udaipur"]);
    let before = test_app.saved_trips(&cookie);

    let req = test::TestRequest::post()
        .uri("/edit-trip/0")
        .cookie(cookie.clone())
        .set_form(edit_form("Udaipur", "a week"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    assert_eq!(test_app.saved_trips(&cookie), before);
}

#[actix_web::test]
async fn test_delete_trip_shifts_indices() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let cookie = test_app.open_session();
    test_app.seed_trips(&cookie, &["Udaipur", "Kochi", "Hampi"]);

    let req = test::TestRequest::get()
        .uri("/delete-trip/0")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp).as_deref(), Some("/my-trips"));

    let cities: Vec<_> = test_app
        .saved_trips(&cookie)
        .into_iter()
        .map(|t| t.params.city)
        .collect();
    assert_eq!(cities, vec!["Kochi", "Hampi"]);

    let req = test::TestRequest::get()
        .uri("/trip/1")
        .cookie(cookie)
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Trip deleted successfully"));
    assert!(body.contains("<dd class=\"trip-city\">Hampi</dd>"));
}

#[actix_web::test]
async fn test_repeated_delete_is_noop_with_flash() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let cookie = test_app.open_session();
    test_app.seed_trips(&cookie, &["Udaipur", "Kochi"]);

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/delete-trip/1")
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp).as_deref(), Some("/my-trips"));
    }

    let trips = test_app.saved_trips(&cookie);
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].params.city, "Udaipur");

    let flashes: Vec<_> = test_app.with_state(&cookie, |s| {
        s.flashes.iter().map(|f| f.message.clone()).collect()
    });
    assert_eq!(flashes, vec!["Trip deleted successfully", "Trip not found"]);
}

#[actix_web::test]
async fn test_trips_are_scoped_to_session() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let owner = test_app.open_session();
    test_app.seed_trips(&owner, &["Udaipur"]);

    let req = test::TestRequest::get().uri("/trip/0").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp).as_deref(), Some("/my-trips"));

    assert_eq!(test_app.saved_trips(&owner).len(), 1);
}
