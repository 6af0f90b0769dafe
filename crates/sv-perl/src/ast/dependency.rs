use itertools::Itertools;
use sv_core::common_struct;

common_struct! {
    /// A header-only `use` declaration, hoisted above body code in the root
    /// container. Dotted package names normalize to `::` paths.
    pub struct Dependency {
        package: String,
        imports: Vec<String>,
    }
}

impl Dependency {
    pub fn bare(package: impl Into<String>) -> Self {
        Self {
            package: normalize(package),
            imports: Vec::new(),
        }
    }

    pub fn with_imports<I, S>(package: impl Into<String>, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            package: normalize(package),
            imports: imports.into_iter().map(Into::into).collect(),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn render(&self) -> String {
        if self.imports.is_empty() {
            format!("use {};\n", self.package)
        } else {
            format!("use {} qw({});\n", self.package, self.imports.iter().join(" "))
        }
    }
}

fn normalize(package: impl Into<String>) -> String {
    package.into().split('.').join("::")
}
