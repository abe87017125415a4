//! Emote records and the identifiers they are keyed by.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use url::Url;

/// Normalized emote lookup key.
///
/// Names are case-sensitive. Surrounding whitespace is stripped on
/// construction, so `" Kappa "` and `"Kappa"` address the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmoteName(Arc<str>);

impl EmoteName {
	pub fn new(name: &str) -> Self {
		Self(Arc::from(name.trim()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl Borrow<str> for EmoteName {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for EmoteName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for EmoteName {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl From<String> for EmoteName {
	fn from(name: String) -> Self {
		Self::new(&name)
	}
}

/// Provider-assigned emote identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmoteId(Arc<str>);

impl EmoteId {
	pub fn new(id: impl AsRef<str>) -> Self {
		Self(Arc::from(id.as_ref()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for EmoteId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Chat channel login used to address channel-scoped emote sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(Arc<str>);

impl ChannelId {
	/// Creates a channel id. Logins are case-insensitive, so the id is lowercased.
	pub fn new(login: &str) -> Self {
		Self(Arc::from(login.trim().to_lowercase()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ChannelId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Third-party emote provider an emote originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provider {
	/// BetterTTV.
	Bttv,
	/// FrankerFaceZ.
	Ffz,
}

impl Provider {
	pub const ALL: [Provider; 2] = [Provider::Bttv, Provider::Ffz];

	/// Stable lowercase key used in configuration and log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Bttv => "bttv",
			Self::Ffz => "ffz",
		}
	}

	/// Human-readable provider name used in tooltips.
	pub const fn display_name(self) -> &'static str {
		match self {
			Self::Bttv => "BetterTTV",
			Self::Ffz => "FrankerFaceZ",
		}
	}

	pub fn from_key(key: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|p| p.as_str().eq_ignore_ascii_case(key))
	}
}

impl fmt::Display for Provider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Whether an emote is usable everywhere or only in one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmoteScope {
	Global,
	Channel,
}

impl EmoteScope {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Global => "global",
			Self::Channel => "channel",
		}
	}
}

/// Image references for one emote at increasing pixel densities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageSet {
	/// Base resolution, always present.
	pub x1: Url,
	pub x2: Option<Url>,
	pub x3: Option<Url>,
}

impl ImageSet {
	pub fn new(x1: Url) -> Self {
		Self { x1, x2: None, x3: None }
	}

	/// Returns the best image for a display scale factor, falling back to
	/// lower densities when a variant is missing.
	pub fn for_scale(&self, scale: f32) -> &Url {
		let x3 = if scale > 2.0 { self.x3.as_ref() } else { None };
		let x2 = if scale > 1.0 { self.x2.as_ref() } else { None };
		x3.or(x2).unwrap_or(&self.x1)
	}
}

/// One provider-supplied emote. Immutable once constructed; shared as `Arc<Emote>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Emote {
	pub id: EmoteId,
	pub name: EmoteName,
	pub images: ImageSet,
	pub provider: Provider,
	pub scope: EmoteScope,
	pub tooltip: String,
	pub home_page: Option<Url>,
	/// Uploader or owner display name, when the provider reports one.
	pub author: Option<String>,
}

impl Emote {
	/// Builds the standard tooltip: name, origin line, and author when known.
	pub fn tooltip_for(name: &EmoteName, provider: Provider, scope: EmoteScope, author: Option<&str>) -> String {
		let scope = match scope {
			EmoteScope::Global => "Global",
			EmoteScope::Channel => "Channel",
		};
		let mut tooltip = format!("{name}\n{} {scope} Emote", provider.display_name());
		if let Some(author) = author {
			tooltip.push_str("\nBy: ");
			tooltip.push_str(author);
		}
		tooltip
	}
}
