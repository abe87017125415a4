//! BetterTTV emote lists.

use serde::Deserialize;
use url::Url;

use super::{EmoteSource, Endpoints, parse_payload_url};
use crate::core::{Emote, EmoteId, EmoteName, ImageSet, Provider};
use crate::fetch::{FetchResult, FetchTarget, ParseError};

pub(super) const GLOBAL_URL: &str = "https://api.betterttv.net/2/emotes";
pub(super) const CHANNEL_URL: &str = "https://api.betterttv.net/2/channels/{channel}";

const DEFAULT_URL_TEMPLATE: &str = "//cdn.betterttv.net/emote/{{id}}/{{image}}";
const HOME_PAGE: &str = "https://betterttv.com/emotes/";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmoteList {
	url_template: Option<String>,
	emotes: Vec<RawEmote>,
}

#[derive(Deserialize)]
struct RawEmote {
	id: Option<String>,
	code: Option<String>,
	/// Uploading channel; only present on channel lists.
	channel: Option<String>,
}

/// BetterTTV source using the v2 API.
#[derive(Debug, Clone)]
pub struct BttvSource {
	endpoints: Endpoints,
}

impl BttvSource {
	pub fn new(endpoints: Endpoints) -> Self {
		Self { endpoints }
	}
}

impl Default for BttvSource {
	fn default() -> Self {
		Self::new(Endpoints::builtin(Provider::Bttv))
	}
}

impl EmoteSource for BttvSource {
	fn provider(&self) -> Provider {
		Provider::Bttv
	}

	fn url(&self, target: &FetchTarget) -> FetchResult<Url> {
		self.endpoints.url(target)
	}

	fn parse(&self, target: &FetchTarget, body: &[u8]) -> Result<Vec<Emote>, ParseError> {
		let list: EmoteList = serde_json::from_slice(body)?;
		let template = list.url_template.as_deref().unwrap_or(DEFAULT_URL_TEMPLATE);
		if !template.contains("{{id}}") {
			return Err(ParseError::Schema(format!("url template {template:?} has no {{{{id}}}} placeholder")));
		}

		list.emotes.into_iter().map(|raw| to_emote(raw, template, target)).collect()
	}
}

fn to_emote(raw: RawEmote, template: &str, target: &FetchTarget) -> Result<Emote, ParseError> {
	let id = raw.id.ok_or(ParseError::MissingField("emotes[].id"))?;
	let code = raw.code.ok_or(ParseError::MissingField("emotes[].code"))?;

	let image = |scale: &str| parse_payload_url(&template.replace("{{id}}", &id).replace("{{image}}", scale));
	let images = ImageSet {
		x1: image("1x")?,
		x2: Some(image("2x")?),
		x3: Some(image("3x")?),
	};

	let name = EmoteName::new(&code);
	let scope = target.scope();
	let author = raw.channel.filter(|c| !c.is_empty());
	let home_page = Url::parse(HOME_PAGE).and_then(|base| base.join(&id)).ok();

	Ok(Emote {
		tooltip: Emote::tooltip_for(&name, Provider::Bttv, scope, author.as_deref()),
		id: EmoteId::new(id),
		name,
		images,
		provider: Provider::Bttv,
		scope,
		home_page,
		author,
	})
}
