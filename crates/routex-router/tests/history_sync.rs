//! Integration tests for history synchronization
//!
//! These tests verify:
//! 1. The first `listen` commits the backend location with a single replace
//! 2. A rehydrated seed takes precedence over the backend location
//! 3. Back/forward navigation commits without writing history
//! 4. The router's own history writes are not re-resolved
//! 5. Dropping the last router handle removes its history subscription

mod common;

use common::{
	Comp, Event, RecordingHistory, app_routes, count, listening_router, record_events,
	router_with,
};
use rstest::rstest;
use routex_history::HistoryBackend;
use routex_router::{RouteSeed, RouterError};
use serde_json::json;

async fn settle() {
	for _ in 0..5 {
		tokio::task::yield_now().await;
	}
}

#[rstest]
#[tokio::test]
async fn test_listen_replaces_once_and_never_pushes() {
	// Arrange
	let history = RecordingHistory::new("/child");
	let (router, mut transitions) = router_with(app_routes(), history.clone());
	let events = record_events(&router);

	// Act
	router.listen().unwrap();
	let outcome = transitions.next().await;

	// Assert
	assert_eq!(outcome, None);
	assert_eq!(router.current_route().unwrap().components(), &["Child"]);
	assert_eq!(history.replace_count(), 1);
	assert_eq!(history.push_count(), 0);
	assert_eq!(history.entries().len(), 1);
	assert_eq!(*events.lock(), vec![Event::Success("/child".into())]);
	assert_eq!(
		history.location().state,
		json!({ "pathname": "/child", "query": {}, "vars": {} })
	);
}

#[rstest]
#[tokio::test]
async fn test_change_success_fires_for_initial_and_run() {
	// Arrange
	let history = RecordingHistory::new("/");
	let (router, mut transitions) = router_with(app_routes(), history.clone());
	let events = record_events(&router);
	router.listen().unwrap();
	transitions.next().await;

	// Act
	router.run("/child", vec![]).await.unwrap();

	// Assert
	assert_eq!(count(&events, |e| matches!(e, Event::Success(_))), 2);
	assert_eq!(count(&events, |e| matches!(e, Event::Start(_))), 1);
	assert_eq!(history.replace_count(), 1);
	assert_eq!(history.push_count(), 1);
}

#[rstest]
#[tokio::test]
async fn test_seed_takes_precedence_over_backend_location() {
	// Arrange
	let history = RecordingHistory::new("/");
	let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
	let router = routex_router::Router::<Comp>::builder(app_routes())
		.history(history.clone())
		.initial_route(RouteSeed::new("/with-variables/kent/7").with_query("tab", "a b"))
		.on_transition(move |error: Option<&RouterError>| {
			let _ = sender.send(error.is_none());
		})
		.build()
		.unwrap();

	// Act
	router.listen().unwrap();
	let succeeded = receiver.recv().await;

	// Assert
	assert_eq!(succeeded, Some(true));
	let route = router.current_route().unwrap();
	assert_eq!(route.components(), &["WithVariables"]);
	assert_eq!(route.vars().get("id"), Some(&"7".to_string()));
	assert_eq!(route.query().get("tab"), Some(&"a b".to_string()));
	assert_eq!(history.location().path(), "/with-variables/kent/7?tab=a%20b");
	assert_eq!(history.replace_count(), 1);
	assert_eq!(history.push_count(), 0);
	assert_eq!(
		RouteSeed::from_state(&history.location().state),
		Some(RouteSeed::from_route(&route))
	);
}

#[rstest]
#[tokio::test]
async fn test_back_and_forward_commit_without_writes() {
	// Arrange
	let history = RecordingHistory::new("/");
	let (router, mut transitions) = listening_router(app_routes(), history.clone()).await;
	router.run("/child", vec![]).await.unwrap();
	transitions.next().await;
	let events = record_events(&router);

	// Act
	history.go_back();
	let back = transitions.next().await;
	let after_back = router.current_route().unwrap();
	history.go_forward();
	let forward = transitions.next().await;

	// Assert
	assert_eq!(back, None);
	assert_eq!(forward, None);
	assert_eq!(after_back.components(), &["A"]);
	assert_eq!(router.current_route().unwrap().components(), &["Child"]);
	assert_eq!(history.push_count(), 1);
	assert_eq!(history.replace_count(), 1);
	assert_eq!(
		*events.lock(),
		vec![Event::Success("/".into()), Event::Success("/child".into())]
	);
}

#[rstest]
#[tokio::test]
async fn test_pop_skips_hooks() {
	// Arrange
	let history = RecordingHistory::new("/");
	let (router, mut transitions) = listening_router(app_routes(), history.clone()).await;
	router.run("/rejected-on-leave", vec![]).await.unwrap();
	transitions.next().await;

	// Act
	history.go_back();
	let outcome = transitions.next().await;

	// Assert
	assert_eq!(outcome, None);
	assert_eq!(router.current_route().unwrap().pathname(), "/");
	assert_eq!(router.state().name(), "TRANSITIONED");
}

#[rstest]
#[tokio::test]
async fn test_own_history_writes_are_not_resolved_again() {
	// Arrange
	let history = RecordingHistory::new("/");
	let (router, mut transitions) = listening_router(app_routes(), history.clone()).await;

	// Act
	router.run("/child", vec![]).await.unwrap();
	transitions.next().await;
	settle().await;

	// Assert
	assert!(transitions.is_idle());
	assert_eq!(history.entries().len(), 2);
	assert_eq!(history.push_count(), 1);
}

#[rstest]
#[tokio::test]
async fn test_initial_location_not_found() {
	// Arrange
	let history = RecordingHistory::new("/nowhere?x=1");
	let (router, mut transitions) = router_with(app_routes(), history.clone());
	let events = record_events(&router);

	// Act
	router.listen().unwrap();
	let outcome = transitions.next().await;

	// Assert
	assert_eq!(outcome.as_deref(), Some("Route not found: /nowhere?x=1"));
	assert_eq!(*events.lock(), vec![Event::NotFound("/nowhere?x=1".into())]);
	assert!(router.current_route().is_none());
	assert_eq!(router.state().name(), "INITIAL");
	assert_eq!(history.replace_count(), 0);
}

#[rstest]
#[tokio::test]
async fn test_popped_entries_carry_router_state() {
	// Arrange
	let history = RecordingHistory::with_entries(&["/", "/child"], 1);
	let (router, mut transitions) = listening_router(app_routes(), history.clone()).await;

	// Act
	history.go_back();
	transitions.next().await;

	// Assert
	assert_eq!(router.current_route().unwrap().pathname(), "/");
	assert_eq!(history.replace_count(), 1);
	assert_eq!(history.entries()[1].pathname, "/child");
	assert_eq!(
		RouteSeed::from_state(&history.entries()[1].state),
		Some(RouteSeed::new("/child"))
	);
}

#[rstest]
#[tokio::test]
async fn test_listener_removal_stops_events() {
	// Arrange
	let history = RecordingHistory::new("/");
	let (router, _transitions) = listening_router(app_routes(), history).await;
	let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
	let id = router.add_change_success_listener(move |event| {
		let _ = sender.send(event.route.pathname().to_string());
	});

	// Act
	router.run("/child", vec![]).await.unwrap();
	let removed = router.remove_listener(id);
	router.run("/", vec![]).await.unwrap();

	// Assert
	assert!(removed);
	assert_eq!(receiver.recv().await.as_deref(), Some("/child"));
	assert!(receiver.try_recv().is_err());
	assert_eq!(router.listener_count(), 0);
}

#[rstest]
#[tokio::test]
async fn test_dropping_router_unsubscribes_from_history() {
	// Arrange
	let history = RecordingHistory::new("/");
	let (router, _transitions) = listening_router(app_routes(), history.clone()).await;
	let handle = router.clone();
	assert_eq!(history.listener_count(), 1);

	// Act
	drop(router);
	settle().await;
	let still_subscribed = history.listener_count();
	drop(handle);
	settle().await;

	// Assert
	assert_eq!(still_subscribed, 1);
	assert_eq!(history.listener_count(), 0);
}
