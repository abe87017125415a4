//! Cross-module tests: fetch lifecycle, facade precedence, concurrent stress.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::json;
use tokio::sync::Notify;
use url::Url;

use crate::core::{Emote, EmoteId, EmoteName, EmoteScope, ImageSet, Provider};
use crate::fetch::{HttpClient, HttpResponse, NetworkError, ProviderFetcher};
use crate::providers::{Endpoints, source_for};
use crate::registry::EmoteRegistry;

mod fetch;

pub(crate) const BTTV_GLOBAL: &str = "https://api.betterttv.net/2/emotes";
pub(crate) const FFZ_GLOBAL: &str = "https://api.frankerfacez.com/v1/set/global";

pub(crate) fn bttv_channel(channel: &str) -> String {
	format!("https://api.betterttv.net/2/channels/{channel}")
}

pub(crate) fn ffz_room(channel: &str) -> String {
	format!("https://api.frankerfacez.com/v1/room/{channel}")
}

struct Scripted {
	reply: Result<HttpResponse, NetworkError>,
	gate: Option<Arc<Notify>>,
}

/// In-memory [`HttpClient`] replaying queued replies per URL.
#[derive(Default)]
pub(crate) struct ScriptedHttp {
	routes: Mutex<FxHashMap<String, VecDeque<Scripted>>>,
	requests: Mutex<Vec<String>>,
}

impl ScriptedHttp {
	pub(crate) fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	fn push(&self, url: &str, scripted: Scripted) {
		self.routes.lock().entry(url.to_owned()).or_default().push_back(scripted);
	}

	pub(crate) fn respond(&self, url: &str, status: u16, body: impl Into<Bytes>) {
		self.push(url, Scripted {
			reply: Ok(HttpResponse::new(status, body)),
			gate: None,
		});
	}

	/// Queues a reply that is only delivered once `gate` is notified.
	pub(crate) fn respond_after(&self, url: &str, gate: Arc<Notify>, status: u16, body: impl Into<Bytes>) {
		self.push(url, Scripted {
			reply: Ok(HttpResponse::new(status, body)),
			gate: Some(gate),
		});
	}

	pub(crate) fn fail(&self, url: &str, err: NetworkError) {
		self.push(url, Scripted { reply: Err(err), gate: None });
	}

	pub(crate) fn fail_after(&self, url: &str, gate: Arc<Notify>, err: NetworkError) {
		self.push(url, Scripted {
			reply: Err(err),
			gate: Some(gate),
		});
	}

	pub(crate) fn requests(&self) -> Vec<String> {
		self.requests.lock().clone()
	}
}

#[async_trait]
impl HttpClient for ScriptedHttp {
	async fn get(&self, url: &Url) -> Result<HttpResponse, NetworkError> {
		self.requests.lock().push(url.to_string());
		let scripted = self.routes.lock().get_mut(url.as_str()).and_then(VecDeque::pop_front);
		let Some(scripted) = scripted else {
			return Err(NetworkError::Transport(format!("no scripted reply for {url}")));
		};
		if let Some(gate) = scripted.gate {
			gate.notified().await;
		}
		scripted.reply
	}
}

/// BetterTTV payload listing `(id, code)` pairs.
pub(crate) fn bttv_body(emotes: &[(&str, &str)]) -> String {
	let emotes: Vec<_> = emotes.iter().map(|(id, code)| json!({"id": id, "code": code, "imageType": "png"})).collect();
	json!({"urlTemplate": "//cdn.betterttv.net/emote/{{id}}/{{image}}", "emotes": emotes}).to_string()
}

fn ffz_emoticons(emotes: &[(u64, &str)]) -> Vec<serde_json::Value> {
	emotes
		.iter()
		.map(|(id, name)| json!({"id": id, "name": name, "urls": {"1": format!("//cdn.frankerfacez.com/emoticon/{id}/1")}}))
		.collect()
}

/// FrankerFaceZ global payload with a single default set.
pub(crate) fn ffz_global_body(emotes: &[(u64, &str)]) -> String {
	json!({"default_sets": [3], "sets": {"3": {"id": 3, "emoticons": ffz_emoticons(emotes)}}}).to_string()
}

/// FrankerFaceZ room payload whose room set is `set`.
pub(crate) fn ffz_room_body(set: u64, emotes: &[(u64, &str)]) -> String {
	json!({"room": {"set": set}, "sets": {set.to_string(): {"emoticons": ffz_emoticons(emotes)}}}).to_string()
}

pub(crate) fn fetcher(provider: Provider, http: &Arc<ScriptedHttp>) -> ProviderFetcher {
	ProviderFetcher::new(source_for(provider, Endpoints::builtin(provider)), http.clone())
}

/// Registry with BetterTTV ahead of FrankerFaceZ.
pub(crate) fn registry(http: &Arc<ScriptedHttp>) -> EmoteRegistry {
	EmoteRegistry::new(vec![fetcher(Provider::Bttv, http), fetcher(Provider::Ffz, http)])
}

/// Hand-built record for tests that publish maps directly.
pub(crate) fn emote(name: &str, id: &str) -> Emote {
	let name = EmoteName::new(name);
	Emote {
		id: EmoteId::new(id),
		tooltip: Emote::tooltip_for(&name, Provider::Bttv, EmoteScope::Global, None),
		name,
		images: ImageSet::new(Url::parse(&format!("https://cdn.test/{id}/1x")).expect("valid test url")),
		provider: Provider::Bttv,
		scope: EmoteScope::Global,
		home_page: None,
		author: None,
	}
}
