use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TITLE_MAX_LEN: usize = 200;
pub const ARTIST_MAX_LEN: usize = 100;
pub const ALBUM_MAX_LEN: usize = 200;
pub const YEAR_MIN: i32 = 1800;

/// A song record as stored in the document.
///
/// JSON keys keep the document's Spanish field names (`titulo`, `artista`,
/// `año`). `uuid` and the timestamps are optional so documents written by
/// older, minimal deployments still load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "artista", default)]
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(rename = "año", default)]
    pub year: Option<i32>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Song {
    /// Build a fresh record from validated fields.
    pub fn new(id: u64, fields: NewSong, now: DateTime<Utc>) -> Self {
        Self {
            id,
            uuid: Some(Uuid::new_v4()),
            title: fields.title,
            artist: fields.artist,
            album: fields.album,
            year: fields.year,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Shallow merge: only fields present in `changes` overwrite. An
    /// explicit `null` for `album` or `año` clears it.
    pub fn apply(&mut self, changes: SongChanges, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(artist) = changes.artist {
            self.artist = artist;
        }
        if let Some(album) = changes.album {
            self.album = album;
        }
        if let Some(year) = changes.year {
            self.year = year;
        }
        self.updated_at = Some(now);
    }
}

/// One violated constraint in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Body of a create request. Unknown keys (including `id`) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct SongCreate {
    #[serde(rename = "titulo")]
    pub title: Option<String>,
    #[serde(rename = "artista")]
    pub artist: Option<String>,
    pub album: Option<String>,
    #[serde(rename = "año")]
    pub year: Option<i32>,
}

/// Validated create payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub year: Option<i32>,
}

impl SongCreate {
    /// Check every field and report all violations together.
    pub fn validate(self) -> Result<NewSong, Vec<FieldError>> {
        let mut errors = Vec::new();
        let current_year = Utc::now().year();

        let title = required_text("titulo", self.title, TITLE_MAX_LEN, &mut errors);
        let artist = required_text("artista", self.artist, ARTIST_MAX_LEN, &mut errors);
        let album = optional_album(self.album, &mut errors);
        check_year(self.year, current_year, &mut errors);

        match (title, artist) {
            (Some(title), Some(artist)) if errors.is_empty() => Ok(NewSong {
                title,
                artist,
                album,
                year: self.year,
            }),
            _ => Err(errors),
        }
    }
}

/// Body of an update request; every field is optional.
///
/// `album` and `año` distinguish an absent key (`None`) from an explicit
/// `null` (`Some(None)`).
#[derive(Debug, Default, Deserialize)]
pub struct SongUpdate {
    #[serde(rename = "titulo")]
    pub title: Option<String>,
    #[serde(rename = "artista")]
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub album: Option<Option<String>>,
    #[serde(rename = "año", default, deserialize_with = "nullable")]
    pub year: Option<Option<i32>>,
}

/// Validated update payload, ready to merge with [`Song::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongChanges {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<Option<String>>,
    pub year: Option<Option<i32>>,
}

impl SongUpdate {
    pub fn validate(self) -> Result<SongChanges, Vec<FieldError>> {
        if self.title.is_none() && self.artist.is_none() && self.album.is_none() && self.year.is_none() {
            return Err(vec![FieldError::new(
                "body",
                "At least one field must be provided for update",
            )]);
        }

        let mut errors = Vec::new();
        let current_year = Utc::now().year();

        let title = self
            .title
            .and_then(|t| required_text("titulo", Some(t), TITLE_MAX_LEN, &mut errors));
        let artist = self
            .artist
            .and_then(|a| required_text("artista", Some(a), ARTIST_MAX_LEN, &mut errors));
        let album = self.album.map(|a| optional_album(a, &mut errors));
        check_year(self.year.flatten(), current_year, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(SongChanges {
            title,
            artist,
            album,
            year: self.year,
        })
    }
}

/// Present-but-null becomes `Some(None)`; `#[serde(default)]` covers absent.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn required_text(
    field: &'static str,
    value: Option<String>,
    max_len: usize,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let Some(raw) = value else {
        errors.push(FieldError::new(field, "Field is required"));
        return None;
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new(
            field,
            "Field cannot be empty after removing whitespace",
        ));
        return None;
    }
    if trimmed.chars().count() > max_len {
        errors.push(FieldError::new(
            field,
            format!("Field must be at most {max_len} characters"),
        ));
        return None;
    }
    Some(trimmed.to_string())
}

/// Trimmed album; blank means no album.
fn optional_album(album: Option<String>, errors: &mut Vec<FieldError>) -> Option<String> {
    let trimmed = album.as_deref().map(str::trim).filter(|a| !a.is_empty())?;
    if trimmed.chars().count() > ALBUM_MAX_LEN {
        errors.push(FieldError::new(
            "album",
            format!("Field must be at most {ALBUM_MAX_LEN} characters"),
        ));
        return None;
    }
    Some(trimmed.to_string())
}

fn check_year(year: Option<i32>, current_year: i32, errors: &mut Vec<FieldError>) {
    if let Some(year) = year {
        if !(YEAR_MIN..=current_year).contains(&year) {
            errors.push(FieldError::new(
                "año",
                format!("Year must be between {YEAR_MIN} and {current_year}"),
            ));
        }
    }
}

/// Accepts RFC 3339 timestamps and the offset-less ISO form older documents
/// contain (read as UTC).
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| parse(&s).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {s}"))))
            .transpose()
    }
}
