use crate::prelude::*;
use attempt_session::mock::MockBackend;
use attempt_session::{Question, QuestionId};
use std::collections::HashMap;
use std::sync::Arc;

/// A test stored in `<test_id>.toml`.
#[derive(Deserialize)]
struct Fixture {
    #[serde(default)]
    questions: Vec<Question>,
    /// Question ID => the solution the mock judge accepts.
    #[serde(default)]
    reference: HashMap<String, String>,
}

impl Fixture {
    fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = util::load_file(path)?;
        toml::from_str(&content).map_err(Error::TOMLParseError)
    }

    fn into_backend(self) -> MockBackend {
        let mut backend = MockBackend::new(self.questions);
        for (id, code) in self.reference {
            backend = backend.with_reference(&QuestionId::new(id), code);
        }
        backend
    }
}

pub fn load(test_id: &str) -> Result<Arc<MockBackend>> {
    let f = test_id.to_owned() + ".toml";
    Ok(Arc::new(Fixture::load(f)?.into_backend()))
}

/// Write whatever the mock registrar received.
pub fn dump(test_id: &str, backend: &MockBackend) -> Result<()> {
    for (_, submission) in backend.submissions() {
        let name = "output/".to_owned() + test_id + ".submission.json";
        util::save_json(name, &submission)?;
    }
    Ok(())
}
