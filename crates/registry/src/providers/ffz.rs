//! FrankerFaceZ emote sets.

use std::collections::BTreeMap;

use serde::Deserialize;
use url::Url;

use super::{EmoteSource, Endpoints, parse_payload_url};
use crate::core::{Emote, EmoteId, EmoteName, ImageSet, Provider};
use crate::fetch::{FetchResult, FetchTarget, ParseError};

pub(super) const GLOBAL_URL: &str = "https://api.frankerfacez.com/v1/set/global";
pub(super) const CHANNEL_URL: &str = "https://api.frankerfacez.com/v1/room/{channel}";

const HOME_PAGE: &str = "https://www.frankerfacez.com/emoticon/";

type Sets = BTreeMap<String, EmoteSetPayload>;

#[derive(Deserialize)]
struct GlobalResponse {
	#[serde(default)]
	default_sets: Vec<u64>,
	sets: Sets,
}

#[derive(Deserialize)]
struct RoomResponse {
	room: Option<Room>,
	sets: Sets,
}

#[derive(Deserialize)]
struct Room {
	set: Option<u64>,
}

#[derive(Deserialize)]
struct EmoteSetPayload {
	#[serde(default)]
	emoticons: Vec<Emoticon>,
}

#[derive(Deserialize)]
struct Emoticon {
	id: Option<u64>,
	name: Option<String>,
	urls: Option<Urls>,
	owner: Option<Owner>,
}

#[derive(Deserialize)]
struct Urls {
	#[serde(rename = "1")]
	x1: Option<String>,
	#[serde(rename = "2")]
	x2: Option<String>,
	#[serde(rename = "4")]
	x4: Option<String>,
}

#[derive(Deserialize)]
struct Owner {
	display_name: Option<String>,
	name: Option<String>,
}

/// FrankerFaceZ source using the v1 API.
#[derive(Debug, Clone)]
pub struct FfzSource {
	endpoints: Endpoints,
}

impl FfzSource {
	pub fn new(endpoints: Endpoints) -> Self {
		Self { endpoints }
	}
}

impl Default for FfzSource {
	fn default() -> Self {
		Self::new(Endpoints::builtin(Provider::Ffz))
	}
}

impl EmoteSource for FfzSource {
	fn provider(&self) -> Provider {
		Provider::Ffz
	}

	fn url(&self, target: &FetchTarget) -> FetchResult<Url> {
		self.endpoints.url(target)
	}

	fn parse(&self, target: &FetchTarget, body: &[u8]) -> Result<Vec<Emote>, ParseError> {
		let (selected, sets) = match target {
			FetchTarget::Global => {
				let response: GlobalResponse = serde_json::from_slice(body)?;
				(response.default_sets, response.sets)
			}
			FetchTarget::Channel(_) => {
				let response: RoomResponse = serde_json::from_slice(body)?;
				let selected = response.room.and_then(|room| room.set).into_iter().collect();
				(selected, response.sets)
			}
		};

		let mut emotes = Vec::new();
		for set in select_sets(&selected, &sets)? {
			for emoticon in &set.emoticons {
				emotes.push(to_emote(emoticon, target)?);
			}
		}
		Ok(emotes)
	}
}

/// Picks the sets named by `selected`, or every set when nothing is selected.
fn select_sets<'a>(selected: &[u64], sets: &'a Sets) -> Result<Vec<&'a EmoteSetPayload>, ParseError> {
	if selected.is_empty() {
		return Ok(sets.values().collect());
	}
	selected
		.iter()
		.map(|id| {
			sets.get(&id.to_string())
				.ok_or_else(|| ParseError::Schema(format!("referenced set {id} is missing from payload")))
		})
		.collect()
}

fn to_emote(raw: &Emoticon, target: &FetchTarget) -> Result<Emote, ParseError> {
	let id = raw.id.ok_or(ParseError::MissingField("emoticons[].id"))?;
	let name = raw.name.as_deref().ok_or(ParseError::MissingField("emoticons[].name"))?;
	let urls = raw.urls.as_ref().ok_or(ParseError::MissingField("emoticons[].urls"))?;
	let x1 = urls.x1.as_deref().ok_or(ParseError::MissingField("emoticons[].urls.1"))?;

	let images = ImageSet {
		x1: parse_payload_url(x1)?,
		x2: urls.x2.as_deref().map(parse_payload_url).transpose()?,
		x3: urls.x4.as_deref().map(parse_payload_url).transpose()?,
	};

	let name = EmoteName::new(name);
	let scope = target.scope();
	let author = raw
		.owner
		.as_ref()
		.and_then(|owner| owner.display_name.clone().or_else(|| owner.name.clone()))
		.filter(|author| !author.is_empty());
	let home_page = Url::parse(HOME_PAGE).and_then(|base| base.join(&id.to_string())).ok();

	Ok(Emote {
		tooltip: Emote::tooltip_for(&name, Provider::Ffz, scope, author.as_deref()),
		id: EmoteId::new(id.to_string()),
		name,
		images,
		provider: Provider::Ffz,
		scope,
		home_page,
		author,
	})
}
