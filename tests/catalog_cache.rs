mod support;

use std::sync::Arc;

use folio::application::catalog::CatalogError;
use folio::cache::CacheBackend;

use support::{CacheOp, InMemoryStore, RecordingCache, StoreCalls, catalog, new_book, new_review};

fn setup() -> (
    Arc<InMemoryStore>,
    Arc<RecordingCache>,
    folio::application::catalog::CatalogService,
) {
    let store = InMemoryStore::new();
    let cache = RecordingCache::new();
    let backend: Arc<dyn CacheBackend> = cache.clone();
    let service = catalog(&store, Some(backend));
    (store, cache, service)
}

#[tokio::test]
async fn book_creation_conflict_and_listing_refresh() {
    let (store, cache, service) = setup();

    service.create_book(new_book("X")).await.expect("create X");
    let listing = service.get_all_books().await.expect("list");
    assert_eq!(listing.len(), 1);
    assert!(cache.contains("books:all"));

    cache.clear_ops();
    let err = service
        .create_book(new_book("X"))
        .await
        .expect_err("duplicate isbn");
    assert!(matches!(err, CatalogError::Conflict { ref isbn } if isbn == "X"));
    assert!(cache.contains("books:all"));
    assert!(cache.deletes().is_empty());

    service.create_book(new_book("Y")).await.expect("create Y");
    assert!(!cache.contains("books:all"));
    assert_eq!(cache.deletes(), vec!["books:all".to_string()]);

    let loads_before = StoreCalls::get(&store.calls.list_with_reviews);
    let listing = service.get_all_books().await.expect("list again");
    assert_eq!(listing.len(), 2);
    assert_eq!(
        StoreCalls::get(&store.calls.list_with_reviews),
        loads_before + 1
    );
    // Most recently created first.
    assert_eq!(listing[0].book.isbn, "Y");
}

#[tokio::test]
async fn duplicate_detected_only_at_insert_is_still_a_conflict() {
    let (store, cache, service) = setup();
    service.create_book(new_book("X")).await.expect("create");
    service.get_all_books().await.expect("warm listing");

    store.skip_isbn_lookup(true);
    let err = service
        .create_book(new_book("X"))
        .await
        .expect_err("unique violation");

    assert!(matches!(err, CatalogError::Conflict { .. }));
    assert!(cache.contains("books:all"));
}

#[tokio::test]
async fn review_on_missing_book_touches_nothing() {
    let (store, cache, service) = setup();

    let err = service
        .create_review(42, new_review(5, "Great"))
        .await
        .expect_err("missing book");

    assert!(matches!(err, CatalogError::NotFound { book_id: 42 }));
    assert_eq!(store.review_count().await, 0);
    assert_eq!(StoreCalls::get(&store.calls.create_review), 0);
    assert!(cache.ops().is_empty());
}

#[tokio::test]
async fn repeated_review_listing_hits_the_store_once() {
    let (store, _cache, service) = setup();
    let book = service.create_book(new_book("X")).await.expect("create");
    service
        .create_review(book.id, new_review(4, "Solid"))
        .await
        .expect("review");

    let first = service
        .get_reviews_for_book(book.id)
        .await
        .expect("first read");
    let second = service
        .get_reviews_for_book(book.id)
        .await
        .expect("second read");

    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert_eq!(StoreCalls::get(&store.calls.list_for_book), 1);
}

#[tokio::test]
async fn reviews_for_missing_book_is_not_found() {
    let (_store, cache, service) = setup();
    let err = service
        .get_reviews_for_book(7)
        .await
        .expect_err("missing book");
    assert!(matches!(err, CatalogError::NotFound { book_id: 7 }));
    assert!(!cache.contains("reviews:book:7"));
}

#[tokio::test]
async fn review_creation_invalidates_reviews_detail_and_listing_in_order() {
    let (_store, cache, service) = setup();
    let book = service.create_book(new_book("X")).await.expect("create");
    service.get_all_books().await.expect("warm listing");
    service.get_book_by_id(book.id).await.expect("warm detail");
    service
        .get_reviews_for_book(book.id)
        .await
        .expect("warm reviews");

    cache.clear_ops();
    service
        .create_review(book.id, new_review(3, "Fine"))
        .await
        .expect("review");

    let id = book.id;
    assert_eq!(
        cache.deletes(),
        vec![
            format!("reviews:book:{id}"),
            format!("book:{id}"),
            "books:all".to_string()
        ]
    );
    assert!(!cache.contains("books:all"));
    assert!(!cache.contains(&format!("book:{id}")));
    assert!(!cache.contains(&format!("reviews:book:{id}")));
}

#[tokio::test]
async fn reads_after_a_write_see_the_write() {
    let (_store, _cache, service) = setup();
    let book = service.create_book(new_book("X")).await.expect("create");

    let before = service.get_book_by_id(book.id).await.expect("detail");
    assert!(before.reviews.is_empty());
    let listing = service.get_all_books().await.expect("listing");
    assert!(listing[0].reviews.is_empty());

    let review = service
        .create_review(book.id, new_review(5, "Loved it"))
        .await
        .expect("review");

    let after = service.get_book_by_id(book.id).await.expect("detail");
    assert_eq!(after.reviews, vec![review.clone()]);
    let listing = service.get_all_books().await.expect("listing");
    assert_eq!(listing[0].reviews, vec![review.clone()]);
    let reviews = service
        .get_reviews_for_book(book.id)
        .await
        .expect("reviews");
    assert_eq!(reviews, vec![review]);
}

#[tokio::test]
async fn cache_hit_matches_the_store() {
    let (store, cache, service) = setup();
    let book = service.create_book(new_book("X")).await.expect("create");
    service
        .create_review(book.id, new_review(2, "Meh"))
        .await
        .expect("review");

    let miss = service.get_book_by_id(book.id).await.expect("miss path");
    assert!(cache.contains(&format!("book:{}", book.id)));
    let hit = service.get_book_by_id(book.id).await.expect("hit path");

    assert_eq!(StoreCalls::get(&store.calls.find_with_reviews), 1);
    assert_eq!(miss, hit);
    assert_eq!(Some(hit), store.snapshot_book(book.id).await);
}

#[tokio::test]
async fn missing_book_is_not_cached() {
    let (store, cache, service) = setup();

    for _ in 0..2 {
        let err = service.get_book_by_id(99).await.expect_err("missing");
        assert!(matches!(err, CatalogError::NotFound { book_id: 99 }));
    }

    assert_eq!(StoreCalls::get(&store.calls.find_with_reviews), 2);
    assert!(!cache.ops().contains(&CacheOp::Set("book:99".to_string())));
}

#[tokio::test]
async fn reviews_are_listed_most_recent_first() {
    let (_store, _cache, service) = setup();
    let book = service.create_book(new_book("X")).await.expect("create");
    let older = service
        .create_review(book.id, new_review(1, "First"))
        .await
        .expect("first");
    let newer = service
        .create_review(book.id, new_review(5, "Second"))
        .await
        .expect("second");

    let reviews = service
        .get_reviews_for_book(book.id)
        .await
        .expect("reviews");
    assert_eq!(reviews, vec![newer, older]);
}

#[tokio::test]
async fn store_failures_surface_and_are_not_cached() {
    let (store, cache, service) = setup();
    store.set_unavailable(true);

    let err = service.get_all_books().await.expect_err("store down");
    assert!(matches!(err, CatalogError::Repo(_)));
    assert!(!cache.contains("books:all"));

    store.set_unavailable(false);
    assert!(service.get_all_books().await.expect("recovered").is_empty());
}
