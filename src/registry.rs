use std::collections::BTreeMap;

use crate::library::Library;
use crate::platform::PlatformModuleIndex;

/// Libraries registered for one analysis run plus the platform modules they
/// are checked against.
#[derive(Debug, Default)]
pub struct PackageRegistry {
    libraries: Vec<Library>,
    platform: PlatformModuleIndex,
}

impl PackageRegistry {
    pub fn new(platform: PlatformModuleIndex) -> Self {
        Self {
            libraries: Vec::new(),
            platform,
        }
    }

    pub fn register(&mut self, library: Library) {
        self.libraries.push(library);
    }

    pub fn extend(&mut self, libraries: impl IntoIterator<Item = Library>) {
        self.libraries.extend(libraries);
    }

    /// Registered libraries in registration order.
    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    pub fn build(&self) -> PackageGroups<'_> {
        group_packages(&self.libraries, &self.platform)
    }
}

/// Package name to every library contributing it.
///
/// For each registered library the library itself is appended, followed by the
/// platform module owning the same package if there is one. No deduplication
/// happens here; see [`PackageGroups::distinct`].
#[derive(Debug, Default)]
pub struct PackageGroups<'a> {
    groups: BTreeMap<&'a str, Vec<&'a Library>>,
}

pub fn group_packages<'a>(
    libraries: &'a [Library],
    platform: &'a PlatformModuleIndex,
) -> PackageGroups<'a> {
    let mut groups: BTreeMap<&'a str, Vec<&'a Library>> = BTreeMap::new();
    for library in libraries {
        for package in library.packages().keys() {
            let values = groups.entry(package.as_str()).or_default();
            values.push(library);
            if let Some(module) = platform.owner(package) {
                values.push(module);
            }
        }
    }
    PackageGroups { groups }
}

impl<'a> PackageGroups<'a> {
    pub fn get(&self, package: &str) -> Option<&[&'a Library]> {
        self.groups.get(package).map(Vec::as_slice)
    }

    /// Groups in ascending package name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &[&'a Library])> + '_ {
        self.groups.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Contributors of `package` without repeats, sorted by location.
    pub fn distinct(&self, package: &str) -> Vec<&'a Library> {
        let mut libraries = self.groups.get(package).cloned().unwrap_or_default();
        libraries.sort();
        libraries.dedup();
        libraries
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
