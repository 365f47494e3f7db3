// src/selector/patterns.rs
// =============================================================================
// Fixed catalogs used to decide which files are worth reading.
//
// - KEY_FILE_NAMES:      manifests, build files and framework configs;
//                        always selected
// - CODE_EXTENSIONS:     only source files with these extensions are
//                        considered past the manifest check
// - ROUTE_KEYWORDS:      routing / entry point hints
// - ARCHITECTURE_KEYWORDS: other structural hints (models, services...)
//
// All comparisons are done on lower-cased text, so entries here are
// compared case-insensitively.
// =============================================================================

pub const KEY_FILE_NAMES: &[&str] = &[
    "package.json",
    "requirements.txt",
    "Pipfile",
    "pyproject.toml",
    "Cargo.toml",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "Gemfile",
    "composer.json",
    ".env.example",
    ".env.sample",
    "docker-compose.yml",
    "Dockerfile",
    "Makefile",
    "README.md",
    "tsconfig.json",
    "vite.config.ts",
    "vite.config.js",
    "webpack.config.js",
    "next.config.js",
    "next.config.ts",
    "nuxt.config.ts",
    "angular.json",
];

/// Without the leading dot
pub const CODE_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "py", "go", "rs", "java", "rb", "php", "cs", "vue", "svelte",
];

pub const ROUTE_KEYWORDS: &[&str] = &[
    "route",
    "router",
    "controller",
    "endpoint",
    "api",
    "handler",
    "middleware",
    "server",
    "app",
    "index",
    "main",
    "urls",
    "views",
];

pub const ARCHITECTURE_KEYWORDS: &[&str] = &[
    "page",
    "screen",
    "component",
    "service",
    "model",
    "schema",
    "database",
    "db",
    "auth",
    "config",
];
