// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The game system model: a unit of behavior with optional capability facets.
//!
//! A [`GameSystem`] opts into any combination of three facets by overriding the
//! matching probe:
//!
//! - [`Updateable`]: ordered by [`Updateable::update_order`], called once per
//!   simulation step while enabled.
//! - [`Drawable`]: ordered by [`Drawable::draw_order`], called once per drawn frame
//!   while visible.
//! - [`Contentable`]: loads and unloads content around the device lifetime.
//!
//! The registry probes the facets once, when the system is added, and caches the
//! result.

mod facets;
mod handle;
mod order;

pub use facets::{Contentable, Drawable, GameSystem, Updateable};
pub use handle::SystemHandle;
pub use order::OrderKey;
