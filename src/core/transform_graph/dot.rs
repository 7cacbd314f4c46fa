use super::{GraphError, TransformGraph};
use std::collections::HashMap;
use std::io::Write;

impl TransformGraph {
    /// Write the graph as a Graphviz `digraph`, one edge per link.
    ///
    /// Characters of space names outside `[0-9A-Za-z_]` become `_`; two spaces reducing to the
    /// same identifier are rejected before anything is written.
    pub fn export_graphviz<W: Write>(&self, sink: &mut W) -> Result<(), GraphError> {
        let identifiers = self.graphviz_identifiers()?;
        writeln!(sink, "digraph transforms {{")?;
        for source in self.spaces() {
            for (target, _) in self.links_from(source)? {
                writeln!(sink, "\t{} -> {};", identifiers[source], identifiers[target])?;
            }
        }
        writeln!(sink, "}}")?;
        Ok(())
    }

    pub fn to_graphviz(&self) -> Result<String, GraphError> {
        let mut buffer = Vec::new();
        self.export_graphviz(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn graphviz_identifiers(&self) -> Result<HashMap<&str, String>, GraphError> {
        let mut identifiers = HashMap::new();
        let mut owners: HashMap<String, &str> = HashMap::new();
        for space in self.spaces() {
            let identifier = sanitize_identifier(space);
            if let Some(first) = owners.insert(identifier.clone(), space) {
                return Err(GraphError::NameCollision {
                    first: first.to_string(),
                    second: space.to_string(),
                    identifier,
                });
            }
            identifiers.insert(space, identifier);
        }
        Ok(identifiers)
    }
}

fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
