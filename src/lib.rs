//! # airone
//!
//! Keeps an iOS project's CocoaPods setup in step with its `airone.json`
//! module manifest. The `airone` command-line tool is a thin wrapper around
//! this library.
//!
//! ## Quick Example
//!
//! ```
//! use airone::config;
//! use airone::document::TextDocument;
//! use airone::injector::FixedAnswer;
//! use airone::pipeline::rewrite_podfile;
//! use airone::region::ModuleLayout;
//!
//! let manifest = config::parse(r#"{
//!     "name": "shop",
//!     "version": "1.0.0",
//!     "modules": [{ "name": "AirNetwork", "git": "https://git.example.com/net.git" }]
//! }"#).unwrap();
//!
//! let mut podfile = TextDocument::parse("target 'Shop' do\n  pod 'Alamofire'\nend\n");
//! rewrite_podfile(&mut podfile, &manifest, &ModuleLayout::default(), FixedAnswer(true)).unwrap();
//!
//! let text = podfile.to_string();
//! assert!(text.contains("pod 'AirNetwork', :path => '../modules/AirNetwork'"));
//! assert!(text.contains("target 'Shop' do\n  airone_modules!\n"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifest (`config`)**: `airone.json`, listing `modules` and
//!   `devModules`, each a named git source.
//! - **Module sync (`sync`)**: clones declared modules that are missing from
//!   `modules/` and `devModules/`.
//! - **Podfile model (`document`, `scanner`)**: the Podfile as a list of
//!   lines, and the scanner that finds the owned region and the target
//!   blocks in it.
//! - **Owned region (`region`)**: the generated `airone_modules!` method
//!   between two marker comments, regenerated on every run.
//! - **Target injection (`injector`)**: asks once per target whether it
//!   should call `airone_modules!`, and records the answer in the file.
//!
//! ## Execution Flow
//!
//! `pipeline::run_install` runs the whole operation: locate the
//! Podfile, sync both module lists, rewrite the owned region, mark every
//! target, and write the Podfile once. Running it again with the same
//! manifest leaves the Podfile byte-for-byte unchanged.

pub mod config;
pub mod document;
pub mod error;
pub mod global;
pub mod injector;
pub mod output;
pub mod pipeline;
pub mod pods;
pub mod region;
pub mod scanner;
pub mod sync;

#[cfg(test)]
mod podfile_proptest;
