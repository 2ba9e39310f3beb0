use std::fmt;
use std::io::Read;
use std::time::{Duration, Instant};

use super::{Config, PseudoRandomReader};
use crate::cancel::CancellationToken;
use crate::dag::{DagBuilder, DagError, DagReader, SizeSplitter};
use crate::error::ErrorKind;
use crate::exchange::{Session, SessionError, SessionGenerator};
use crate::linked_data::Cid;
use crate::path::{ResolveError, Resolver};

/// Seed for the data every run adds
pub const SEED: u64 = 1;

const MIB: u64 = 1024 * 1024;

/// Stage of an add/cat run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Build,
    Resolve,
    Read,
    Verify,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Setup => "setup",
            Phase::Build => "build",
            Phase::Resolve => "resolve",
            Phase::Read => "read",
            Phase::Verify => "verify",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AddCatError {
    #[error("session setup failed: {0}")]
    Setup(#[from] SessionError),
    #[error("adding data failed: {0}")]
    Build(#[source] DagError),
    #[error("resolving the added root failed: {0}")]
    Resolve(#[source] ResolveError),
    #[error("reading the data back failed: {0}")]
    Read(#[source] DagError),
    #[error("reading the expected data failed: {0}")]
    Source(#[source] std::io::Error),
    #[error("catted data does not match added data: first difference at byte {offset} ({catted} of {expected} bytes read)")]
    Mismatch {
        offset: u64,
        catted: u64,
        expected: u64,
    },
}

impl AddCatError {
    pub fn phase(&self) -> Phase {
        match self {
            AddCatError::Setup(_) => Phase::Setup,
            AddCatError::Build(_) => Phase::Build,
            AddCatError::Resolve(_) => Phase::Resolve,
            AddCatError::Read(_) => Phase::Read,
            AddCatError::Source(_) | AddCatError::Mismatch { .. } => Phase::Verify,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AddCatError::Setup(_) | AddCatError::Source(_) => ErrorKind::Other,
            AddCatError::Build(err) | AddCatError::Read(err) => err.kind(),
            AddCatError::Resolve(err) => err.kind(),
            AddCatError::Mismatch { .. } => ErrorKind::Corrupt,
        }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct AddCatReport {
    pub config: Config,
    pub root: Cid,
    pub bytes: u64,
    pub add_elapsed: Duration,
    pub cat_elapsed: Duration,
}

impl fmt::Display for AddCatReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes -> {} (add {:?}, cat {:?})",
            self.bytes, self.root, self.add_elapsed, self.cat_elapsed
        )
    }
}

/// One peer adds `config.data_amount_bytes` of seeded data, a second
///  peer resolves the root and reads it all back over the network.
pub async fn add_cat_bytes(config: &Config) -> Result<AddCatReport, AddCatError> {
    let mut generator =
        SessionGenerator::with_latency(config.network_latency, config.routing_latency);
    let result = add_cat_with(&mut generator, config).await;
    generator.close();
    result
}

/// Same as [`add_cat_bytes`], over sessions from an existing generator
pub async fn add_cat_with(
    generator: &mut SessionGenerator,
    config: &Config,
) -> Result<AddCatReport, AddCatError> {
    let adder = generator.next().await?;
    let catter = generator.next().await?;
    catter.set_blockstore_latency(config.blockstore_latency);
    let cancel = CancellationToken::new();

    // the add itself runs without disk latency
    adder.set_blockstore_latency(Duration::ZERO);
    let started = Instant::now();
    let source = PseudoRandomReader::new(config.data_amount_bytes, SEED);
    let root = add(&adder, source, &cancel)
        .await
        .map_err(AddCatError::Build)?;
    let add_elapsed = started.elapsed();
    // the catter pulls from the adder's store, so it waits on it too
    adder.set_blockstore_latency(config.blockstore_latency);

    let started = Instant::now();
    let reader = cat(&catter, &root, &cancel).await?;
    let bytes = verify(reader, config.data_amount_bytes).await?;
    let cat_elapsed = started.elapsed();

    let report = AddCatReport {
        config: *config,
        root,
        bytes,
        add_elapsed,
        cat_elapsed,
    };
    tracing::info!(
        root = %report.root,
        bytes,
        add_ms = add_elapsed.as_millis() as u64,
        cat_ms = cat_elapsed.as_millis() as u64,
        "add_cat: run complete"
    );
    Ok(report)
}

/// Run [`add_cat_bytes`] for 1, 2, 4, ... MiB while the size stays
///  under `megabytes_max`
pub async fn add_cat_powers(
    config: &Config,
    megabytes_max: u64,
) -> Result<Vec<AddCatReport>, AddCatError> {
    let mut reports = Vec::new();
    let mut megabytes = 1;
    while megabytes < megabytes_max {
        tracing::info!(megabytes, "add_cat_powers: starting run");
        let config = config.with_data_amount(megabytes * MIB);
        reports.push(add_cat_bytes(&config).await?);
        megabytes *= 2;
    }
    Ok(reports)
}

/// Build a DAG from `reader` in the session's store
pub async fn add<R: Read + Send>(
    session: &Session,
    reader: R,
    cancel: &CancellationToken,
) -> Result<Cid, DagError> {
    DagBuilder::new(session.dag())
        .build(reader, &SizeSplitter::default(), cancel)
        .await
}

/// Resolve `root` from the session and open a reader over it
pub async fn cat(
    session: &Session,
    root: &Cid,
    cancel: &CancellationToken,
) -> Result<DagReader, AddCatError> {
    let dag = session.dag();
    let node = Resolver::offline(dag.clone())
        .resolve(&root.to_string(), cancel)
        .await
        .map_err(AddCatError::Resolve)?;
    Ok(DagReader::new(node, dag, cancel.clone()))
}

/// Stream `reader` against a fresh copy of the seeded data
async fn verify(reader: DagReader, expected: u64) -> Result<u64, AddCatError> {
    verify_against(reader, PseudoRandomReader::new(expected, SEED), expected).await
}

async fn verify_against<R: Read>(
    mut reader: DagReader,
    mut source: R,
    expected: u64,
) -> Result<u64, AddCatError> {
    let mut want = Vec::new();
    let mut catted = 0u64;

    while let Some(chunk) = reader.read_chunk().await.map_err(AddCatError::Read)? {
        want.resize(chunk.len(), 0);
        let n = read_full(&mut source, &mut want).map_err(AddCatError::Source)?;
        if let Some(i) = chunk.iter().zip(&want[..n]).position(|(a, b)| a != b) {
            return Err(AddCatError::Mismatch {
                offset: catted + i as u64,
                catted: catted + chunk.len() as u64,
                expected,
            });
        }
        if n < chunk.len() {
            return Err(AddCatError::Mismatch {
                offset: catted + n as u64,
                catted: catted + chunk.len() as u64,
                expected,
            });
        }
        catted += chunk.len() as u64;
    }

    if catted != expected {
        return Err(AddCatError::Mismatch {
            offset: catted,
            catted,
            expected,
        });
    }
    Ok(catted)
}

/// Fill `buf` from `source`, short only at end of input
fn read_full<R: Read>(source: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
