//! # Flatland Core
//!
//! `flatland-core` turns a plain-text two-character dialogue script into a
//! timed sequence of audiovisual cues and plays it through a rendering
//! collaborator.
//!
//! Data flows one way: raw text → [`Directive`]s → resolved profiles and
//! assets → [`Timeline`] → [`RenderBackend`] calls.
//!
//! ## Usage
//!
//! ```rust
//! use flatland_core::{
//!     parse_script, ActionLog, ActorProfileRegistry, PlaybackDriver, SfxLibrary,
//!     TimelineBuilder, VoiceCache,
//! };
//!
//! let directives = parse_script("BARRY: Hi.\nCARL: Yo.\n[LAUGH]");
//! let cast = ActorProfileRegistry::from_directives("BARRY", "CARL", &directives);
//! let (sfx, voices) = (SfxLibrary::default(), VoiceCache::default());
//! let timeline = TimelineBuilder::new(&cast, &sfx, &voices).build(&directives);
//!
//! let mut log = ActionLog::new();
//! PlaybackDriver::new(&mut log).run(&cast, &timeline).unwrap();
//! ```

/// Directive Parser: raw text to typed directives.
pub mod parser;

/// Actor Profile Registry.
pub mod cast;

/// Colors, named colors and shapes.
pub mod types;

/// Scene backdrop palette.
pub mod palette;

/// Sound-effect Asset Resolver.
pub mod sfx;

/// Voice Cache Builder.
pub mod voice;

/// Timeline Builder.
pub mod timeline;

/// Playback Driver and the rendering collaborator contract.
pub mod playback;

pub mod errors;

pub use cast::{ActorProfile, ActorProfileRegistry, ActorRef};
pub use errors::{AssetError, DownloadError, RenderError, VoiceError};
pub use parser::{parse_document, parse_script, render_script, split_script, Directive};
pub use playback::{ActionLog, PlaybackDriver, PlaybackReport, PlaybackState, RenderAction, RenderBackend};
pub use sfx::{Downloader, HttpDownloader, OfflineDownloader, SfxAsset, SfxLibrary, SfxResolver, SfxSettings, SfxTag};
pub use timeline::{line_duration, EventKind, Timeline, TimelineBuilder, TimelineEvent, UnknownCuePolicy};
pub use types::{Color, ColorName, Shape};
pub use voice::{build_voice_cache, VoiceAsset, VoiceCache};
