//! Shared utilities for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

/// An application directory in a throwaway location, removed on drop.
pub struct TestApplications {
    root: PathBuf,
}

impl TestApplications {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("app-router-test-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write `<name>/config/application.toml`.
    pub fn add(&self, name: &str, config: &str) -> &Self {
        self.add_file(name, "application.toml", config)
    }

    /// Write an arbitrary file into `<name>/config/`.
    pub fn add_file(&self, name: &str, file: &str, content: &str) -> &Self {
        let dir = self.root.join(name).join("config");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), content).unwrap();
        self
    }

    /// Create a directory without any configuration.
    #[allow(dead_code)]
    pub fn add_bare(&self, name: &str) -> &Self {
        fs::create_dir_all(self.root.join(name)).unwrap();
        self
    }
}

impl Drop for TestApplications {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// The shop fixture used across tests.
#[allow(dead_code)]
pub fn shop_fixture() -> TestApplications {
    let apps = TestApplications::new();
    apps.add(
        "shop",
        r#"
        hostnames = ["shop.example.com", "*.shop.example.com"]
        default_language = "en"
        handler_namespace = "shop"

        [handlers]
        "catalog/item" = "shop::product"

        [[routes]]
        handler = "shop::product"
        patterns = ["$language[en,nl]/product/$id"]

        [[routes]]
        handler = "shop::search"
        patterns = ["search", "search/$q"]
        "#,
    )
    .add(
        "blog",
        r#"
        hostnames = ["example.com"]
        base_uri = "/blog"
        handler_namespace = "blog"

        [[routes]]
        handler = "blog::post"
        patterns = ["$year/$slug"]
        "#,
    )
    .add(
        "site",
        r#"
        hostnames = ["example.com"]
        "#,
    );
    apps
}
