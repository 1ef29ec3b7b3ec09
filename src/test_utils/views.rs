//! Temporary view folders.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::constants::DEFAULT_FILE_EXTENSION;
use crate::engine::Blade;

/// The demo view set: a page extending a layout that includes a header and a
/// footer. The page uses the custom `@uppercase` directive, which callers
/// register themselves.
pub const DEMO_VIEWS: &[(&str, &str)] = &[
    (
        "home.index",
        "@extends('shared.layout')

@section('looping-test')
    <p>Odd numbers under {{ numbers | length }}:</p>
    <p>
    @foreach(numbers as number)
        @if(loop.first)
        first:
        @endif
        @if(number % 2 != 0)
        {{ number }}
        @endif
        @if(loop.last)
        :last
        @endif
    @endforeach
    </p>
@endsection
",
    ),
    (
        "shared.layout",
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
    <meta charset=\"UTF-8\">
    <title>{{ title }}</title>
</head>
@include('shared.header')
<body>
    <div id=\"container\">
        <h3>Welcome to <span class=\"reddish\">{{ title }}</span></h3>
        <p>{{ content }}</p>
        <p>@uppercase(mytext)</p>
        @yield('looping-test')
    </div>
    @include('shared.footer')
</body>
</html>
",
    ),
    ("shared.header", "<header><a href=\"{{ link }}\">{{ title }}</a></header>\n"),
    ("shared.footer", "<footer>{{ footer or 'Powered by Blade' }}</footer>\n"),
];

/// A temporary view folder and cache folder, removed on drop.
pub struct TestViews {
    /// Owns the temporary directory
    pub temp_dir: TempDir,
    /// `<temp>/views`
    pub view_folder: PathBuf,
    /// `<temp>/cache`
    pub cache_folder: PathBuf,
}

impl TestViews {
    /// Create empty view and cache folders.
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let view_folder = temp_dir.path().join("views");
        let cache_folder = temp_dir.path().join("cache");
        fs::create_dir_all(&view_folder)?;

        Ok(Self {
            temp_dir,
            view_folder,
            cache_folder,
        })
    }

    /// Create the folders and write [`DEMO_VIEWS`].
    pub fn with_demo() -> Result<Self> {
        let views = Self::new()?;
        for (name, text) in DEMO_VIEWS {
            views.write(name, text)?;
        }
        Ok(views)
    }

    /// Path of the template file for a dotted or slashed name.
    #[must_use]
    pub fn path_of(&self, name: &str) -> PathBuf {
        let relative = name.trim_start_matches('/').replace('.', "/");
        self.view_folder.join(format!("{relative}{DEFAULT_FILE_EXTENSION}"))
    }

    /// Write a template, creating parent folders.
    pub fn write(&self, name: &str, text: &str) -> Result<PathBuf> {
        let path = self.path_of(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    /// Set a template's modification time.
    pub fn set_modified(&self, name: &str, time: SystemTime) -> Result<()> {
        let path = self.path_of(name);
        let file = fs::OpenOptions::new().write(true).open(&path)?;
        file.set_modified(time).with_context(|| format!("touching {}", path.display()))?;
        Ok(())
    }

    /// Compiled artifact files currently in the cache folder.
    pub fn artifacts(&self) -> Result<Vec<PathBuf>> {
        if !self.cache_folder.exists() {
            return Ok(Vec::new());
        }
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.cache_folder)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "compiled"))
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// An engine over these folders with default settings.
    pub fn blade(&self) -> Result<Blade> {
        Ok(Blade::new(&self.view_folder, &self.cache_folder)?)
    }

    /// The temporary root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }
}
