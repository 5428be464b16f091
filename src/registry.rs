//! Record registry: assets and maintenance tickets that carry an issued code.
//!
//! Records live outside the sequence store and go through the `FileSystem`
//! port. Directory layout:
//!
//! ```text
//! <root>/
//!   ├── assets/<code>.yaml
//!   └── tickets/<code>.yaml
//! ```
//!
//! A code is issued first and the record written second. If the write
//! fails the code is burned, leaving a gap but never a duplicate. A repeated
//! submission carrying the same `submission_key` returns the record created
//! by the first one and issues nothing.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::code::{code_order, validate_code, DEFAULT_SEPARATOR, TICKET_CATEGORY};
use crate::context::ServiceContext;
use crate::error::{CodeError, RegistryError};
use crate::generator::CodeGenerator;

/// A registered asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Storage identifier.
    pub id: String,
    /// Asset number, e.g. `LAPTOP-2501-0001`.
    pub code: String,
    /// Asset type; also the counter category.
    pub asset_type: String,
    /// Display name.
    pub name: String,
    /// Idempotency key of the submission that created it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_key: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for [`RecordStore::create_asset`].
#[derive(Debug, Clone, Default)]
pub struct NewAsset {
    /// Asset type (counter category).
    pub asset_type: String,
    /// Display name.
    pub name: String,
    /// Optional idempotency key.
    pub submission_key: Option<String>,
}

/// Lifecycle of a maintenance ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Reported, not started.
    #[default]
    Open,
    /// A technician is working on it.
    InProgress,
    /// Resolved.
    Done,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        })
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown ticket status {other:?} (open, in_progress, done)")),
        }
    }
}

/// A maintenance ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Storage identifier.
    pub id: String,
    /// Ticket number, e.g. `TKT-2503-0038`.
    pub code: String,
    /// Raw sequence behind `code`.
    pub sequence: u64,
    /// Short description of the work.
    pub title: String,
    /// Asset the work is for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_code: Option<String>,
    /// Planned maintenance date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<NaiveDate>,
    /// Current status.
    #[serde(default)]
    pub status: TicketStatus,
    /// Idempotency key of the submission that created it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_key: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for [`RecordStore::open_ticket`].
#[derive(Debug, Clone, Default)]
pub struct NewTicket {
    /// Short description of the work.
    pub title: String,
    /// Asset the work is for; must exist if given.
    pub asset_code: Option<String>,
    /// Planned maintenance date.
    pub scheduled_for: Option<NaiveDate>,
    /// Optional idempotency key.
    pub submission_key: Option<String>,
}

/// Persists assets and tickets, issuing their codes on creation.
pub struct RecordStore<'a> {
    ctx: &'a ServiceContext,
    root: PathBuf,
    assets: CodeGenerator<'a>,
    tickets: CodeGenerator<'a>,
}

impl<'a> RecordStore<'a> {
    /// Creates a store rooted at `root` issuing codes from the given generators.
    #[must_use]
    pub fn new(
        ctx: &'a ServiceContext,
        root: &Path,
        assets: CodeGenerator<'a>,
        tickets: CodeGenerator<'a>,
    ) -> Self {
        Self { ctx, root: root.to_path_buf(), assets, tickets }
    }

    /// Registers an asset under the next code for its type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Invalid`] for a blank name,
    /// [`RegistryError::Code`] if no code could be issued and
    /// [`RegistryError::Storage`] if the record cannot be read or written.
    pub fn create_asset(&self, new: NewAsset) -> Result<Asset, RegistryError> {
        if new.name.trim().is_empty() {
            return Err(RegistryError::Invalid("asset name is required".into()));
        }
        if let Some(key) = new.submission_key.as_deref() {
            let existing =
                self.list_assets()?.into_iter().find(|a| a.submission_key.as_deref() == Some(key));
            if let Some(existing) = existing {
                info!(code = %existing.code, submission = key, "duplicate asset submission");
                return Ok(existing);
            }
        }

        ensure_storable(&self.assets, &new.asset_type)?;
        let issued = self.assets.next_code(&new.asset_type)?;
        let asset = Asset {
            id: self.ctx.id_gen.generate_id(),
            code: issued.code,
            asset_type: new.asset_type,
            name: new.name,
            submission_key: new.submission_key,
            created_at: self.ctx.clock.now(),
        };
        self.save("assets", &asset.code, &asset)?;
        info!(code = %asset.code, "asset registered");
        Ok(asset)
    }

    /// Opens a ticket under the next ticket number.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Invalid`] for a blank title,
    /// [`RegistryError::NotFound`] if `asset_code` names no asset,
    /// [`RegistryError::Code`] if no code could be issued, and
    /// [`RegistryError::Storage`] on read/write failures.
    pub fn open_ticket(&self, new: NewTicket) -> Result<Ticket, RegistryError> {
        if new.title.trim().is_empty() {
            return Err(RegistryError::Invalid("ticket title is required".into()));
        }
        if let Some(key) = new.submission_key.as_deref() {
            let existing =
                self.list_tickets()?.into_iter().find(|t| t.submission_key.as_deref() == Some(key));
            if let Some(existing) = existing {
                info!(code = %existing.code, submission = key, "duplicate ticket submission");
                return Ok(existing);
            }
        }
        if let Some(asset) = new.asset_code.as_deref() {
            if !self.path("assets", asset).is_some_and(|path| self.ctx.fs.exists(&path)) {
                return Err(RegistryError::NotFound(asset.to_string()));
            }
        }

        ensure_storable(&self.tickets, TICKET_CATEGORY)?;
        let issued = self.tickets.next_code(TICKET_CATEGORY)?;
        let ticket = Ticket {
            id: self.ctx.id_gen.generate_id(),
            code: issued.code,
            sequence: issued.sequence,
            title: new.title,
            asset_code: new.asset_code,
            scheduled_for: new.scheduled_for,
            status: TicketStatus::Open,
            submission_key: new.submission_key,
            created_at: self.ctx.clock.now(),
        };
        self.save("tickets", &ticket.code, &ticket)?;
        info!(code = %ticket.code, "ticket opened");
        Ok(ticket)
    }

    /// Changes a ticket's status.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no ticket has `code`.
    pub fn set_ticket_status(
        &self,
        code: &str,
        status: TicketStatus,
    ) -> Result<Ticket, RegistryError> {
        let mut ticket = self.load_ticket(code)?;
        ticket.status = status;
        self.save("tickets", code, &ticket)?;
        Ok(ticket)
    }

    /// Loads one ticket by code.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no ticket has `code`.
    pub fn load_ticket(&self, code: &str) -> Result<Ticket, RegistryError> {
        match self.path("tickets", code) {
            Some(path) if self.ctx.fs.exists(&path) => self.load(&path),
            _ => Err(RegistryError::NotFound(code.to_string())),
        }
    }

    /// All assets ordered by type, period and sequence.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Storage`] if a record cannot be read.
    pub fn list_assets(&self) -> Result<Vec<Asset>, RegistryError> {
        self.list("assets")
    }

    /// All tickets ordered by period and sequence.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Storage`] if a record cannot be read.
    pub fn list_tickets(&self) -> Result<Vec<Ticket>, RegistryError> {
        self.list("tickets")
    }

    /// `None` for anything that is not a well-formed code, which keeps
    /// lookups inside `root`.
    fn path(&self, kind: &str, code: &str) -> Option<PathBuf> {
        validate_code(code).ok()?;
        Some(self.root.join(kind).join(format!("{code}.yaml")))
    }

    fn save<T: Serialize>(&self, kind: &str, code: &str, record: &T) -> Result<(), RegistryError> {
        let yaml = serde_yaml::to_string(record)
            .map_err(|e| RegistryError::Storage(format!("Failed to serialize {code}: {e}")))?;
        let path = self
            .path(kind, code)
            .ok_or_else(|| RegistryError::Invalid(format!("{code} is not a storable code")))?;
        self.ctx
            .fs
            .write(&path, &yaml)
            .map_err(|e| RegistryError::Storage(format!("Failed to write {code}: {e}")))
    }

    fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T, RegistryError> {
        let contents = self
            .ctx
            .fs
            .read_to_string(path)
            .map_err(|e| RegistryError::Storage(format!("Failed to read {}: {e}", path.display())))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| RegistryError::Storage(format!("Failed to parse {}: {e}", path.display())))
    }

    fn list<T: DeserializeOwned + Coded>(&self, kind: &str) -> Result<Vec<T>, RegistryError> {
        let dir = self.root.join(kind);
        if !self.ctx.fs.exists(&dir) {
            return Ok(Vec::new());
        }
        let names = self
            .ctx
            .fs
            .list_dir(&dir)
            .map_err(|e| RegistryError::Storage(format!("Failed to list {kind}: {e}")))?;
        let mut records = names
            .iter()
            .filter(|name| name.ends_with(".yaml"))
            .map(|name| self.load(&dir.join(name)))
            .collect::<Result<Vec<T>, _>>()?;
        sort_by_code(&mut records);
        Ok(records)
    }
}

/// Rejects categories whose codes could not be saved, before a sequence
/// number is spent on them.
fn ensure_storable(generator: &CodeGenerator<'_>, category: &str) -> Result<(), CodeError> {
    generator.family().validate(category)?;
    let sample = generator.family().render(category, &generator.current_period(), 0);
    validate_code(&sample)
}

/// Records that carry an issued code.
trait Coded {
    fn code(&self) -> &str;
}

impl Coded for Asset {
    fn code(&self) -> &str {
        &self.code
    }
}

impl Coded for Ticket {
    fn code(&self) -> &str {
        &self.code
    }
}

fn sort_by_code<T: Coded>(records: &mut [T]) {
    records.sort_by(|a, b| {
        code_order(a.code(), DEFAULT_SEPARATOR).cmp(&code_order(b.code(), DEFAULT_SEPARATOR))
    });
}
