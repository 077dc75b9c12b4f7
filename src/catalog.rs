use crate::error::{CatalogError, ProbeError};
use crate::probe::{probe, ProbedInstallation};
use crate::scanner::Scanner;
use crate::selection::Choice;
use crate::version::VersionTuple;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A launchable installation with its place in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallationRecord {
    ordinal: usize,
    #[serde(flatten)]
    installation: ProbedInstallation,
}

impl InstallationRecord {
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn folder_name(&self) -> &str {
        &self.installation.folder_name
    }

    pub fn version_display(&self) -> &str {
        &self.installation.version_display
    }

    pub fn version(&self) -> VersionTuple {
        self.installation.version
    }

    pub fn install_path(&self) -> &Path {
        &self.installation.install_path
    }

    pub fn executable_path(&self) -> &Path {
        &self.installation.executable_path
    }
}

/// Installations sorted newest first and numbered from 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    records: Vec<InstallationRecord>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InstallationRecord> {
        self.records.iter()
    }

    pub fn get(&self, ordinal: usize) -> Option<&InstallationRecord> {
        ordinal.checked_sub(1).and_then(|i| self.records.get(i))
    }

    pub fn latest(&self) -> Option<&InstallationRecord> {
        self.records.first()
    }

    pub fn resolve(&self, choice: &Choice) -> Option<&InstallationRecord> {
        match choice {
            Choice::Latest => self.latest(),
            Choice::SelectOrdinal(n) => self.get(*n),
            Choice::Quit | Choice::Configure | Choice::Invalid => None,
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a InstallationRecord;
    type IntoIter = std::slice::Iter<'a, InstallationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

pub struct CatalogBuilder;

impl CatalogBuilder {
    /// Probe every candidate and order the survivors.
    ///
    /// Candidates without an executable are dropped. Equal versions keep
    /// their candidate order.
    pub fn build<I>(candidates: I) -> Result<Catalog, ProbeError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        Self::build_with(candidates, probe)
    }

    pub(crate) fn build_with<I, F>(candidates: I, mut probe_fn: F) -> Result<Catalog, ProbeError>
    where
        I: IntoIterator<Item = PathBuf>,
        F: FnMut(&Path) -> Result<Option<ProbedInstallation>, ProbeError>,
    {
        let mut found = Vec::new();
        for candidate in candidates {
            if let Some(installation) = probe_fn(&candidate)? {
                found.push(installation);
            }
        }

        // sort_by is stable
        found.sort_by(|a, b| b.version.cmp(&a.version));

        let records = found
            .into_iter()
            .enumerate()
            .map(|(i, installation)| InstallationRecord {
                ordinal: i + 1,
                installation,
            })
            .collect::<Vec<_>>();

        tracing::info!("Catalog built with {} installation(s)", records.len());
        Ok(Catalog { records })
    }
}

/// Scan `base` and build the catalog of launchable installations.
pub fn discover(base: &Path) -> Result<Catalog, CatalogError> {
    let candidates = Scanner::new(base).scan()?;
    Ok(CatalogBuilder::build(candidates)?)
}
