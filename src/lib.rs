// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! aikeys manages API credentials for external AI inference providers such
//! as ForefrontAI and Replicate. Credentials can come from the environment
//! or be stored per user, in which case a user's own settings take
//! precedence over the environment.
//!
//! # Examples
//!
//! (In all examples, replace `your_name` with your actual username.)
//!
//! Register a new user:
//!
//! ```bash
//! aikeys add-user
//! ```
//!
//! List every supported provider and the environment variables it uses:
//!
//! ```bash
//! aikeys providers
//! ```
//!
//! Store a Replicate API token for yourself:
//!
//! ```bash
//! aikeys settings set your_name REPLICATE_API_TOKEN r8_...
//! ```
//!
//! Load your provider credentials into the current shell:
//!
//! ```bash
//! eval "$(aikeys env your_name)"
//! ```
//!
//! Check that Replicate accepts your token:
//!
//! ```bash
//! aikeys verify replicate --user your_name
//! ```
//!
//! Get usage and help for the tool:
//!
//! ```bash
//! aikeys --help
//! ```
//!
//! # Provider Setup
//!
//! Each [provider](provider::Provider) reads its credentials from one or
//! more environment variables. For example:
//!
//! - **ForefrontAI** uses `$FOREFRONTAI_API_KEY`.
//! - **Replicate** uses `$REPLICATE_API_TOKEN`.
//!
//! Set these in your deployment's environment file, or in your shell:
//!
//! ```bash
//! $ export REPLICATE_API_TOKEN='copied api token'
//! ```
//!
//! The same variables can instead be stored for a single user with
//! `aikeys settings set`; see [`conf::provider_env()`] for how the two
//! are combined.
//!
//! **Requests made with these credentials are proxied to the provider's
//! own servers.** Please read the provider's privacy policy before using
//! it; `aikeys providers` links to it where one is known.
//!
//! # Demo Mode
//!
//! When `$ENABLE_DEMO_MODE` is set, anyone who has not signed in is
//! treated as the read-only `demo` user, who can view settings but
//! not change them.
//!
//! # License
//!
//! aikeys is licensed under the terms of the [Apache License 2.0]. Please
//! see the LICENSE file accompanying this source code or visit the previous
//! link for more information on licensing.
//!
//! [Apache License 2.0]: https://www.apache.org/licenses/LICENSE-2.0

pub mod account;
pub mod auth;
pub mod cli;
pub mod conf;
pub mod db;
pub mod http;
pub mod prompt;
pub mod provider;
pub mod service;
pub mod session;
pub mod settings;
pub mod store;
pub mod text;
