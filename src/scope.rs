//! OAuth scopes and the [ScopeSet] bitset.
//!
//! Every [Scope] occupies a single fixed bit in a [ScopeSet]. The bit assignments never change and are never reused,
//! so a set's [raw value](ScopeSet::bits) may be stored and restored with [from_bits](ScopeSet::from_bits).
//!
//! ```
//! # use spotifly::scope::{Scope, ScopeSet};
//! let mut scopes = ScopeSet::default();
//! assert!(scopes.has(Scope::UserReadEmail));
//! assert!(!scopes.has(Scope::PlaylistModifyPublic));
//!
//! scopes.set("playlist_modify_public", true).unwrap();
//! assert!(scopes.has(Scope::PlaylistModifyPublic));
//!
//! let write_scopes = ScopeSet::all() & !ScopeSet::default();
//! assert!(write_scopes.has(Scope::Streaming));
//! ```

use std::{
    fmt::Display,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not},
    str::FromStr,
};

use crate::error::{Error, Result};

pub(crate) trait ToScopesString
where
    Self: IntoIterator<Item = Scope>,
{
    fn to_scopes_string(self) -> String;
}

/// A single OAuth scope. The declaration order matches the scope's bit position in a [ScopeSet].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    UgcImageUpload,
    UserReadPlaybackState,
    AppRemoteControl,
    UserModifyPlaybackState,
    PlaylistReadPrivate,
    UserFollowModify,
    PlaylistReadCollaborative,
    UserFollowRead,
    UserReadCurrentlyPlaying,
    UserReadPlaybackPosition,
    UserLibraryModify,
    PlaylistModifyPrivate,
    PlaylistModifyPublic,
    UserReadEmail,
    UserTopRead,
    Streaming,
    UserReadRecentlyPlayed,
    UserReadPrivate,
    UserLibraryRead,
}

/// A set of [scopes](Scope) backed by a single integer.
///
/// Sets are combined with [union](ScopeSet::union), [intersect](ScopeSet::intersect), [xor](ScopeSet::xor) and
/// [invert](ScopeSet::invert), or the equivalent `|`, `&`, `^` and `!` operators. Two sets are equal if and only if
/// their backing integers are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeSet {
    value: u32,
}

/// Iterator over a [ScopeSet]'s flags as `(name, enabled)` pairs in declaration order.
#[derive(Debug, Clone)]
pub struct ScopeSetIter {
    set: ScopeSet,
    index: usize,
}

impl Scope {
    /// Every scope in declaration order.
    pub const ALL: [Scope; 19] = [
        Scope::UgcImageUpload,
        Scope::UserReadPlaybackState,
        Scope::AppRemoteControl,
        Scope::UserModifyPlaybackState,
        Scope::PlaylistReadPrivate,
        Scope::UserFollowModify,
        Scope::PlaylistReadCollaborative,
        Scope::UserFollowRead,
        Scope::UserReadCurrentlyPlaying,
        Scope::UserReadPlaybackPosition,
        Scope::UserLibraryModify,
        Scope::PlaylistModifyPrivate,
        Scope::PlaylistModifyPublic,
        Scope::UserReadEmail,
        Scope::UserTopRead,
        Scope::Streaming,
        Scope::UserReadRecentlyPlayed,
        Scope::UserReadPrivate,
        Scope::UserLibraryRead,
    ];

    /// The scope's bit in a [ScopeSet].
    pub const fn bit(self) -> u32 {
        1 << self as u32
    }

    /// The scope's flag name, e.g. `user_read_email`.
    pub fn name(self) -> &'static str {
        match self {
            Scope::UgcImageUpload => "ugc_image_upload",
            Scope::UserReadPlaybackState => "user_read_playback_state",
            Scope::AppRemoteControl => "app_remote_control",
            Scope::UserModifyPlaybackState => "user_modify_playback_state",
            Scope::PlaylistReadPrivate => "playlist_read_private",
            Scope::UserFollowModify => "user_follow_modify",
            Scope::PlaylistReadCollaborative => "playlist_read_collaborative",
            Scope::UserFollowRead => "user_follow_read",
            Scope::UserReadCurrentlyPlaying => "user_read_currently_playing",
            Scope::UserReadPlaybackPosition => "user_read_playback_position",
            Scope::UserLibraryModify => "user_library_modify",
            Scope::PlaylistModifyPrivate => "playlist_modify_private",
            Scope::PlaylistModifyPublic => "playlist_modify_public",
            Scope::UserReadEmail => "user_read_email",
            Scope::UserTopRead => "user_top_read",
            Scope::Streaming => "streaming",
            Scope::UserReadRecentlyPlayed => "user_read_recently_played",
            Scope::UserReadPrivate => "user_read_private",
            Scope::UserLibraryRead => "user_library_read",
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::UgcImageUpload => write!(f, "ugc-image-upload"),
            Scope::UserReadPlaybackState => write!(f, "user-read-playback-state"),
            Scope::AppRemoteControl => write!(f, "app-remote-control"),
            Scope::UserModifyPlaybackState => write!(f, "user-modify-playback-state"),
            Scope::PlaylistReadPrivate => write!(f, "playlist-read-private"),
            Scope::UserFollowModify => write!(f, "user-follow-modify"),
            Scope::PlaylistReadCollaborative => write!(f, "playlist-read-collaborative"),
            Scope::UserFollowRead => write!(f, "user-follow-read"),
            Scope::UserReadCurrentlyPlaying => write!(f, "user-read-currently-playing"),
            Scope::UserReadPlaybackPosition => write!(f, "user-read-playback-position"),
            Scope::UserLibraryModify => write!(f, "user-library-modify"),
            Scope::PlaylistModifyPrivate => write!(f, "playlist-modify-private"),
            Scope::PlaylistModifyPublic => write!(f, "playlist-modify-public"),
            Scope::UserReadEmail => write!(f, "user-read-email"),
            Scope::UserTopRead => write!(f, "user-top-read"),
            Scope::Streaming => write!(f, "streaming"),
            Scope::UserReadRecentlyPlayed => write!(f, "user-read-recently-played"),
            Scope::UserReadPrivate => write!(f, "user-read-private"),
            Scope::UserLibraryRead => write!(f, "user-library-read"),
        }
    }
}

/// Parses a scope from either its flag name (`user_read_email`) or its OAuth form (`user-read-email`).
impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalised = s.replace('-', "_");

        Scope::ALL
            .into_iter()
            .find(|scope| scope.name() == normalised)
            .ok_or_else(|| Error::InvalidFlagName(s.to_owned()))
    }
}

impl<I> ToScopesString for I
where
    I: IntoIterator<Item = Scope>,
{
    fn to_scopes_string(self) -> String {
        self.into_iter()
            .map(|scope| scope.to_string())
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl ScopeSet {
    /// Mask of every defined bit. The highest assigned bit defines the set's width.
    const FULL_MASK: u32 = (1 << Scope::ALL.len() as u32) - 1;

    /// The write, modify and streaming scopes left out of [default](ScopeSet::default).
    const DEFAULT_EXCLUDED: [Scope; 8] = [
        Scope::UgcImageUpload,
        Scope::AppRemoteControl,
        Scope::UserModifyPlaybackState,
        Scope::UserFollowModify,
        Scope::UserLibraryModify,
        Scope::PlaylistModifyPrivate,
        Scope::PlaylistModifyPublic,
        Scope::Streaming,
    ];

    /// A set with no scopes enabled.
    pub const fn empty() -> Self {
        Self { value: 0 }
    }

    /// A set with every scope enabled.
    pub const fn all() -> Self {
        Self {
            value: Self::FULL_MASK,
        }
    }

    /// Builds a set from its raw value. Bits that don't belong to any scope are dropped.
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            value: bits & Self::FULL_MASK,
        }
    }

    /// The set's raw value.
    pub const fn bits(self) -> u32 {
        self.value
    }

    /// Whether no scope is enabled in this set.
    pub const fn is_empty(self) -> bool {
        self.value == 0
    }

    /// Whether the given scope is enabled in this set.
    pub const fn has(self, scope: Scope) -> bool {
        self.value & scope.bit() == scope.bit()
    }

    /// Whether the scope with the given name is enabled in this set. The name may be given as the flag name
    /// (`user_read_email`) or in the OAuth form (`user-read-email`).
    pub fn has_named(self, name: &str) -> Result<bool> {
        Ok(self.has(name.parse()?))
    }

    /// Enables or disables the scope with the given name. Fails with [Error::InvalidFlagName] if the name does not
    /// belong to any scope.
    pub fn set(&mut self, name: &str, enabled: bool) -> Result<()> {
        self.set_scope(name.parse()?, enabled);
        Ok(())
    }

    /// Enables or disables the given scope.
    pub fn set_scope(&mut self, scope: Scope, enabled: bool) {
        if enabled {
            self.value |= scope.bit();
        } else {
            self.value &= !scope.bit();
        }
    }

    /// Returns a copy of this set with the given scope enabled.
    pub const fn with(self, scope: Scope) -> Self {
        Self {
            value: self.value | scope.bit(),
        }
    }

    /// Returns a copy of this set with the given scope disabled.
    pub const fn without(self, scope: Scope) -> Self {
        Self {
            value: self.value & !scope.bit(),
        }
    }

    pub const fn union(self, other: Self) -> Self {
        Self {
            value: self.value | other.value,
        }
    }

    pub const fn intersect(self, other: Self) -> Self {
        Self {
            value: self.value & other.value,
        }
    }

    pub const fn xor(self, other: Self) -> Self {
        Self {
            value: self.value ^ other.value,
        }
    }

    /// Flips every scope in the set.
    pub const fn invert(self) -> Self {
        Self {
            value: self.value ^ Self::FULL_MASK,
        }
    }

    /// Iterates the set's flags as `(name, enabled)` pairs in declaration order.
    pub fn iter(&self) -> ScopeSetIter {
        ScopeSetIter { set: *self, index: 0 }
    }

    /// Iterates the scopes enabled in this set.
    pub fn scopes(self) -> impl Iterator<Item = Scope> {
        Scope::ALL.into_iter().filter(move |scope| self.has(*scope))
    }

    /// The enabled scopes as a space-separated string, in the form Spotify's authorization endpoint expects.
    pub fn to_scopes_string(self) -> String {
        ToScopesString::to_scopes_string(self.scopes())
    }
}

/// Every scope except the write, modify and streaming scopes; enough for reading values from the API.
impl Default for ScopeSet {
    fn default() -> Self {
        Self::DEFAULT_EXCLUDED
            .into_iter()
            .fold(Self::all(), |set, scope| set.without(scope))
    }
}

impl From<Scope> for ScopeSet {
    fn from(scope: Scope) -> Self {
        Self::empty().with(scope)
    }
}

impl FromIterator<Scope> for ScopeSet {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Scope>,
    {
        iter.into_iter().fold(Self::empty(), ScopeSet::with)
    }
}

impl Iterator for ScopeSetIter {
    type Item = (&'static str, bool);

    fn next(&mut self) -> Option<Self::Item> {
        let scope = Scope::ALL.get(self.index)?;
        self.index += 1;

        Some((scope.name(), self.set.has(*scope)))
    }
}

impl IntoIterator for &ScopeSet {
    type Item = (&'static str, bool);
    type IntoIter = ScopeSetIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl BitOr for ScopeSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitAnd for ScopeSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersect(rhs)
    }
}

impl BitXor for ScopeSet {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        self.xor(rhs)
    }
}

impl Not for ScopeSet {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.invert()
    }
}

impl BitOrAssign for ScopeSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.value |= rhs.value;
    }
}

impl BitAndAssign for ScopeSet {
    fn bitand_assign(&mut self, rhs: Self) {
        self.value &= rhs.value;
    }
}

impl BitXorAssign for ScopeSet {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.value ^= rhs.value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_fixed_in_declaration_order() {
        for (index, scope) in Scope::ALL.into_iter().enumerate() {
            assert_eq!(scope.bit(), 1 << index);
        }

        assert_eq!(Scope::UgcImageUpload.bit(), 1);
        assert_eq!(Scope::Streaming.bit(), 32768);
        assert_eq!(Scope::UserLibraryRead.bit(), 262144);
    }

    #[test]
    fn set_then_has_for_every_name() {
        for scope in Scope::ALL {
            let mut set = ScopeSet::empty();

            set.set(scope.name(), true).unwrap();
            assert!(set.has(scope));
            assert!(set.has_named(scope.name()).unwrap());

            set.set(scope.name(), false).unwrap();
            assert!(!set.has(scope));
            assert!(set.is_empty());
        }
    }

    #[test]
    fn set_accepts_oauth_form() {
        let mut set = ScopeSet::empty();
        set.set("user-read-email", true).unwrap();

        assert!(set.has(Scope::UserReadEmail));
    }

    #[test]
    fn set_clearing_keeps_other_flags() {
        let mut set = ScopeSet::all();
        set.set("streaming", false).unwrap();

        assert!(!set.has(Scope::Streaming));
        assert_eq!(set.scopes().count(), 18);
    }

    #[test]
    fn invalid_flag_name() {
        let mut set = ScopeSet::empty();

        assert!(matches!(
            set.set("user_read_minds", true),
            Err(Error::InvalidFlagName(name)) if name == "user_read_minds"
        ));
        assert!(matches!(set.has_named(""), Err(Error::InvalidFlagName(_))));
        assert!(set.is_empty());
    }

    #[test]
    fn union_has_either_flag() {
        let a: ScopeSet = [Scope::UserReadEmail, Scope::Streaming].into_iter().collect();
        let b: ScopeSet = [Scope::Streaming, Scope::UserTopRead, Scope::UgcImageUpload].into_iter().collect();
        let union = a.union(b);

        for scope in Scope::ALL {
            assert_eq!(union.has(scope), a.has(scope) || b.has(scope), "{scope:?}");
        }

        assert_eq!(a | b, union);
    }

    #[test]
    fn intersect_and_xor() {
        let a: ScopeSet = [Scope::UserReadEmail, Scope::Streaming].into_iter().collect();
        let b: ScopeSet = [Scope::Streaming, Scope::UserTopRead].into_iter().collect();

        assert_eq!(a.intersect(b), ScopeSet::from(Scope::Streaming));
        assert_eq!(
            a.xor(b),
            [Scope::UserReadEmail, Scope::UserTopRead].into_iter().collect::<ScopeSet>()
        );
        assert_eq!(a & b, a.intersect(b));
        assert_eq!(a ^ b, a.xor(b));
    }

    #[test]
    fn assigning_operators() {
        let mut set = ScopeSet::from(Scope::UserReadEmail);
        set |= ScopeSet::from(Scope::Streaming);
        assert_eq!(set.bits(), Scope::UserReadEmail.bit() | Scope::Streaming.bit());

        set &= ScopeSet::from(Scope::Streaming);
        assert_eq!(set, ScopeSet::from(Scope::Streaming));

        set ^= ScopeSet::from(Scope::Streaming);
        assert!(set.is_empty());
    }

    #[test]
    fn invert_stays_within_width() {
        assert_eq!(ScopeSet::empty().invert(), ScopeSet::all());
        assert_eq!(!ScopeSet::all(), ScopeSet::empty());
        assert_eq!(ScopeSet::all().bits(), 0x7_FFFF);

        let set = ScopeSet::from(Scope::UserLibraryRead);
        assert_eq!((!set).bits(), 0x3_FFFF);
    }

    #[test]
    fn default_excludes_write_scopes() {
        let excluded = [
            Scope::UgcImageUpload,
            Scope::AppRemoteControl,
            Scope::UserModifyPlaybackState,
            Scope::UserFollowModify,
            Scope::UserLibraryModify,
            Scope::PlaylistModifyPrivate,
            Scope::PlaylistModifyPublic,
            Scope::Streaming,
        ];

        let default = ScopeSet::default();

        for scope in Scope::ALL {
            assert_eq!(default.has(scope), !excluded.contains(&scope), "{scope:?}");
        }
    }

    #[test]
    fn from_bits_truncates_unknown_bits() {
        assert_eq!(ScopeSet::from_bits(u32::MAX), ScopeSet::all());
        assert_eq!(ScopeSet::from_bits(1 << 31), ScopeSet::empty());
    }

    #[test]
    fn iteration_in_declaration_order() {
        let set = ScopeSet::from(Scope::AppRemoteControl);
        let pairs: Vec<_> = set.iter().collect();

        assert_eq!(pairs.len(), 19);
        assert_eq!(pairs[0], ("ugc_image_upload", false));
        assert_eq!(pairs[2], ("app_remote_control", true));
        assert_eq!(pairs[18], ("user_library_read", false));
        assert_eq!(pairs.iter().filter(|(_, enabled)| *enabled).count(), 1);
    }

    #[test]
    fn scopes_string_is_dash_cased() {
        let set: ScopeSet = [Scope::UserReadEmail, Scope::PlaylistReadPrivate].into_iter().collect();
        assert_eq!(set.to_scopes_string(), "playlist-read-private user-read-email");
    }

    #[test]
    fn scope_round_trips_through_name() {
        for scope in Scope::ALL {
            assert_eq!(scope.name().parse::<Scope>().unwrap(), scope);
            assert_eq!(scope.to_string().parse::<Scope>().unwrap(), scope);
        }
    }
}
