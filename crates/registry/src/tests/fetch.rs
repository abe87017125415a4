use std::sync::Arc;

use pretty_assertions::assert_eq;
use tokio::sync::Notify;

use super::{BTTV_GLOBAL, FFZ_GLOBAL, ScriptedHttp, bttv_body, bttv_channel, fetcher, ffz_global_body, ffz_room, ffz_room_body};
use crate::core::{ChannelId, Provider, Snapshot};
use crate::fetch::{FetchError, FetchOutcome, NetworkError};

async fn wait_for_requests(http: &ScriptedHttp, count: usize) {
	while http.requests().len() < count {
		tokio::task::yield_now().await;
	}
}

#[tokio::test]
async fn load_global_publishes_complete_map() {
	let http = ScriptedHttp::new();
	http.respond(BTTV_GLOBAL, 200, bttv_body(&[("a1", "FeelsGoodMan"), ("a2", "monkaS")]));
	let bttv = fetcher(Provider::Bttv, &http);

	let outcome = bttv.load_global().await.unwrap();
	let FetchOutcome::Published { count, .. } = outcome else {
		panic!("expected publish, got {outcome:?}");
	};
	assert_eq!(count, 2);
	assert_eq!(bttv.lookup("monkaS").unwrap().id.as_str(), "a2");
	assert!(bttv.lookup("NotAnEmote").is_none());
	assert_eq!(bttv.global().in_flight(), 0);
	assert_eq!(bttv.global().last_error(), None);
	assert_eq!(http.requests(), [BTTV_GLOBAL]);
}

#[tokio::test]
async fn lookup_before_first_load_is_absent() {
	let http = ScriptedHttp::new();
	let ffz = fetcher(Provider::Ffz, &http);
	assert!(ffz.global().get().is_none());
	assert!(ffz.lookup("LilZ").is_none());
	assert_eq!(ffz.global().len(), 0);
}

#[tokio::test]
async fn network_failure_keeps_previous_map() {
	let http = ScriptedHttp::new();
	http.respond(FFZ_GLOBAL, 200, ffz_global_body(&[(1, "LilZ")]));
	http.fail(FFZ_GLOBAL, NetworkError::Timeout);
	let ffz = fetcher(Provider::Ffz, &http);

	ffz.load_global().await.unwrap();
	let before = ffz.global().get().unwrap();

	let err = ffz.load_global().await.unwrap_err();
	assert!(matches!(err, FetchError::Network(NetworkError::Timeout)), "{err}");

	let after = ffz.global().get().unwrap();
	assert!(Snapshot::ptr_eq(&before, &after));
	assert!(ffz.lookup("LilZ").is_some());
	assert!(ffz.global().last_error().is_some());
}

#[tokio::test]
async fn parse_failure_keeps_previous_map() {
	let http = ScriptedHttp::new();
	http.respond(BTTV_GLOBAL, 200, bttv_body(&[("a1", "Kappa")]));
	http.respond(BTTV_GLOBAL, 200, r#"{"emotes": [{"id": "a2"}]}"#);
	let bttv = fetcher(Provider::Bttv, &http);

	bttv.load_global().await.unwrap();
	let err = bttv.load_global().await.unwrap_err();
	assert!(matches!(err, FetchError::Parse(_)), "{err}");
	assert_eq!(bttv.lookup("Kappa").unwrap().id.as_str(), "a1");
	assert_eq!(bttv.global().len(), 1);
}

#[tokio::test]
async fn failure_on_first_load_leaves_set_empty() {
	let http = ScriptedHttp::new();
	http.fail(BTTV_GLOBAL, NetworkError::Transport("connection refused".into()));
	let bttv = fetcher(Provider::Bttv, &http);

	assert!(bttv.load_global().await.is_err());
	assert!(bttv.global().get().is_none());
	assert_eq!(bttv.global().in_flight(), 0);
}

#[tokio::test]
async fn error_status_is_network_error() {
	let http = ScriptedHttp::new();
	http.respond(BTTV_GLOBAL, 503, "unavailable");
	let bttv = fetcher(Provider::Bttv, &http);

	let err = bttv.load_global().await.unwrap_err();
	let FetchError::Network(NetworkError::Status { status, url }) = err else {
		panic!("expected status error, got {err}");
	};
	assert_eq!(status, 503);
	assert_eq!(url, BTTV_GLOBAL);
}

#[tokio::test]
async fn global_not_found_is_a_failure() {
	let http = ScriptedHttp::new();
	http.respond(FFZ_GLOBAL, 404, "");
	let ffz = fetcher(Provider::Ffz, &http);

	assert!(ffz.load_global().await.is_err());
	assert!(ffz.global().get().is_none());
}

#[tokio::test]
async fn unknown_channel_publishes_empty_map() {
	let http = ScriptedHttp::new();
	http.respond(&ffz_room("nobody"), 404, r#"{"error": "Not Found"}"#);
	let ffz = fetcher(Provider::Ffz, &http);
	let set = ffz.channel_set(ChannelId::new("nobody"));

	let outcome = ffz.load_for_channel(&set).await.unwrap();
	assert!(matches!(outcome, FetchOutcome::Published { count: 0, .. }), "{outcome:?}");
	let map = set.get().unwrap();
	assert!(map.is_empty());
	assert_eq!(set.last_error(), None);
}

#[tokio::test]
async fn out_of_order_completion_keeps_newest_fetch() {
	let http = ScriptedHttp::new();
	let gate = Arc::new(Notify::new());
	http.respond_after(BTTV_GLOBAL, gate.clone(), 200, bttv_body(&[("old", "Stale")]));
	http.respond(BTTV_GLOBAL, 200, bttv_body(&[("new", "Fresh")]));
	let bttv = fetcher(Provider::Bttv, &http);

	let slow = bttv.load_global();
	wait_for_requests(&http, 1).await;
	let fast = bttv.load_global();
	assert_eq!(bttv.global().in_flight(), 2);

	let FetchOutcome::Published { generation: newest, .. } = fast.await.unwrap() else {
		panic!("second fetch should publish");
	};
	gate.notify_one();
	let outcome = slow.await.unwrap();
	let FetchOutcome::Superseded { generation, current } = outcome else {
		panic!("first fetch should be superseded, got {outcome:?}");
	};
	assert!(generation < current);
	assert_eq!(current, newest);

	assert!(bttv.lookup("Fresh").is_some());
	assert!(bttv.lookup("Stale").is_none());
	assert_eq!(bttv.global().generation(), Some(newest));
	assert_eq!(bttv.global().in_flight(), 0);
}

#[tokio::test]
async fn stale_failure_does_not_mask_newer_success() {
	let http = ScriptedHttp::new();
	let gate = Arc::new(Notify::new());
	http.fail_after(BTTV_GLOBAL, gate.clone(), NetworkError::Timeout);
	http.respond(BTTV_GLOBAL, 200, bttv_body(&[("a1", "Kappa")]));
	let bttv = fetcher(Provider::Bttv, &http);

	let slow = bttv.load_global();
	wait_for_requests(&http, 1).await;
	bttv.load_global().await.unwrap();

	gate.notify_one();
	assert!(slow.await.is_err());
	assert!(bttv.lookup("Kappa").is_some());
	assert_eq!(bttv.global().last_error(), None);
}

#[tokio::test]
async fn direct_set_supersedes_outstanding_fetch() {
	let http = ScriptedHttp::new();
	let gate = Arc::new(Notify::new());
	http.respond_after(BTTV_GLOBAL, gate.clone(), 200, bttv_body(&[("net", "FromNetwork")]));
	let bttv = fetcher(Provider::Bttv, &http);

	let pending = bttv.load_global();
	wait_for_requests(&http, 1).await;
	bttv.global().set([super::emote("Local", "l1")].into_iter().collect());

	gate.notify_one();
	let outcome = pending.await.unwrap();
	assert!(matches!(outcome, FetchOutcome::Superseded { .. }), "{outcome:?}");
	assert!(bttv.lookup("Local").is_some());
	assert!(bttv.lookup("FromNetwork").is_none());
}

#[tokio::test]
async fn detached_channel_discards_result() {
	let http = ScriptedHttp::new();
	let gate = Arc::new(Notify::new());
	http.respond_after(&bttv_channel("forsen"), gate.clone(), 200, bttv_body(&[("c1", "forsenE")]));
	let bttv = fetcher(Provider::Bttv, &http);

	let set = bttv.channel_set(ChannelId::new("forsen"));
	let pending = bttv.load_for_channel(&set);
	wait_for_requests(&http, 1).await;
	drop(set);

	gate.notify_one();
	assert_eq!(pending.await.unwrap(), FetchOutcome::Detached);
}

#[tokio::test]
async fn channel_sets_are_independent() {
	let http = ScriptedHttp::new();
	http.respond(&ffz_room("forsen"), 200, ffz_room_body(10, &[(1, "forsenE")]));
	http.respond(&ffz_room("pajlada"), 200, ffz_room_body(20, &[(2, "pajaW")]));
	let ffz = fetcher(Provider::Ffz, &http);

	let forsen = ffz.channel_set(ChannelId::new("Forsen"));
	let pajlada = ffz.channel_set(ChannelId::new("pajlada"));
	ffz.load_for_channel(&forsen).await.unwrap();
	ffz.load_for_channel(&pajlada).await.unwrap();

	assert!(forsen.lookup("forsenE").is_some());
	assert!(forsen.lookup("pajaW").is_none());
	assert!(pajlada.lookup("pajaW").is_some());
	assert!(ffz.global().get().is_none());
}

#[tokio::test]
async fn reload_reuses_unchanged_records() {
	let http = ScriptedHttp::new();
	http.respond(BTTV_GLOBAL, 200, bttv_body(&[("a1", "Kappa"), ("a2", "Pog")]));
	http.respond(BTTV_GLOBAL, 200, bttv_body(&[("a1", "Kappa"), ("a3", "Pog")]));
	let bttv = fetcher(Provider::Bttv, &http);

	bttv.load_global().await.unwrap();
	let kappa = bttv.lookup("Kappa").unwrap();
	let pog = bttv.lookup("Pog").unwrap();

	bttv.load_global().await.unwrap();
	assert!(Arc::ptr_eq(&kappa, &bttv.lookup("Kappa").unwrap()));
	assert!(!Arc::ptr_eq(&pog, &bttv.lookup("Pog").unwrap()));
	assert_eq!(bttv.lookup("Pog").unwrap().id.as_str(), "a3");
}

#[tokio::test]
async fn dropped_handle_still_publishes() {
	let http = ScriptedHttp::new();
	http.respond(BTTV_GLOBAL, 200, bttv_body(&[("a1", "Kappa")]));
	let bttv = fetcher(Provider::Bttv, &http);

	drop(bttv.load_global());
	while bttv.global().in_flight() > 0 {
		tokio::task::yield_now().await;
	}
	assert!(bttv.lookup("Kappa").is_some());
}

#[tokio::test]
async fn aborted_fetch_releases_in_flight() {
	let http = ScriptedHttp::new();
	let gate = Arc::new(Notify::new());
	http.respond_after(BTTV_GLOBAL, gate, 200, bttv_body(&[("a1", "Kappa")]));
	let bttv = fetcher(Provider::Bttv, &http);

	let pending = bttv.load_global();
	wait_for_requests(&http, 1).await;
	assert_eq!(bttv.global().in_flight(), 1);

	pending.abort();
	let err = pending.await.unwrap_err();
	assert!(matches!(err, FetchError::Worker(_)), "{err}");
	assert_eq!(bttv.global().in_flight(), 0);
	assert!(bttv.global().get().is_none());
}
