// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Run configuration, threaded explicitly through every pipeline stage.
/// There is no mutable global state anywhere in this crate (Design Note
/// 3): flags, the statement list and the output sink are all passed
/// around as plain values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Peephole pass enabled.
    pub peephole: bool,
    /// Deep (CFG) pass enabled. Implies a trailing peephole round.
    pub deep: bool,
    /// Id-constant reuse pass enabled.
    pub idconst: bool,
    /// Emit CR before every newline (Unix -> DOS line endings).
    pub unix2dos: bool,
    /// Trace optimizer decisions at `info` level.
    pub verbose: bool,
}

impl Default for Config {
    /// The default configuration: peephole and id-constant reuse on,
    /// deep optimization off, Unix line endings, not verbose.
    fn default() -> Self {
        Config {
            peephole: true,
            deep: false,
            idconst: true,
            unix2dos: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Apply `-O0`: disable every optimizer pass.
    pub fn disable_all_optimizations(&mut self) {
        self.peephole = false;
        self.deep = false;
        self.idconst = false;
    }

    /// Apply `-OD`: enable the deep pass (on top of whatever peephole /
    /// id-const settings are already in effect).
    pub fn enable_deep(&mut self) {
        self.deep = true;
    }
}
