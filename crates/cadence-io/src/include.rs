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

//! A text effect compiler that expands include directives.

use crate::effect::{EffectCompiler, EffectOutput};
use crate::error::EffectError;
use std::path::{Path, PathBuf};

/// Compiles plain-text effects.
///
/// `#include "file"` lines are replaced by the contents of `file`, resolved
/// relative to the including file, and every included file becomes a
/// dependency. An `#error message` line fails the compilation. Everything else
/// is copied to the output as is.
#[derive(Debug, Clone)]
pub struct IncludeCompiler {
    max_depth: usize,
}

impl IncludeCompiler {
    /// Creates a compiler that follows includes up to `max_depth` levels deep.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    fn expand(
        &self,
        path: &Path,
        depth: usize,
        output: &mut Vec<u8>,
        dependencies: &mut Vec<PathBuf>,
    ) -> Result<(), EffectError> {
        if depth > self.max_depth {
            return Err(EffectError::Compile {
                path: path.to_path_buf(),
                message: format!("includes nested deeper than {}", self.max_depth),
            });
        }
        let source = std::fs::read_to_string(path).map_err(|source| EffectError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        for (number, line) in source.lines().enumerate() {
            let directive = line.trim();
            if let Some(rest) = directive.strip_prefix("#include") {
                let name = rest.trim().trim_matches('"');
                let included = path.parent().unwrap_or_else(|| Path::new(".")).join(name);
                if !dependencies.contains(&included) {
                    dependencies.push(included.clone());
                }
                self.expand(&included, depth + 1, output, dependencies)?;
            } else if let Some(message) = directive.strip_prefix("#error") {
                return Err(EffectError::Compile {
                    path: path.to_path_buf(),
                    message: format!("line {}: {}", number + 1, message.trim()),
                });
            } else {
                output.extend_from_slice(line.as_bytes());
                output.push(b'\n');
            }
        }
        Ok(())
    }
}

impl Default for IncludeCompiler {
    fn default() -> Self {
        Self::new(16)
    }
}

impl EffectCompiler for IncludeCompiler {
    fn compile(&mut self, path: &Path) -> Result<EffectOutput, EffectError> {
        let mut bytecode = Vec::new();
        let mut dependencies = Vec::new();
        self.expand(path, 0, &mut bytecode, &mut dependencies)?;
        Ok(EffectOutput {
            bytecode,
            dependencies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_are_expanded_and_recorded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("common.fxh"), "float4 tint;").unwrap();
        let main = dir.path().join("main.fx");
        std::fs::write(&main, "#include \"common.fxh\"\nfloat4 main() {}").unwrap();

        let output = IncludeCompiler::default().compile(&main).unwrap();

        assert_eq!(output.bytecode, b"float4 tint;\nfloat4 main() {}\n");
        assert_eq!(output.dependencies, vec![dir.path().join("common.fxh")]);
    }

    #[test]
    fn error_directive_reports_the_line() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.fx");
        std::fs::write(&main, "ok\n#error missing sampler\n").unwrap();

        let err = IncludeCompiler::default().compile(&main).unwrap_err();

        assert!(err.to_string().ends_with("line 2: missing sampler"));
    }

    #[test]
    fn include_cycles_are_cut_off() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("loop.fx");
        std::fs::write(&main, "#include \"loop.fx\"\n").unwrap();

        let err = IncludeCompiler::new(3).compile(&main).unwrap_err();

        assert!(matches!(err, EffectError::Compile { .. }));
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let err = IncludeCompiler::default()
            .compile(Path::new("/nonexistent/effect.fx"))
            .unwrap_err();
        assert!(matches!(err, EffectError::Io { .. }));
    }
}
