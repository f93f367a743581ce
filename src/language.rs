use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A programming language a student may answer a coding question in.
///
/// The set is closed: the judge only knows how to build and run these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    JavaScript,
    Python,
    Cpp,
    Java,
    C,
}

const JAVASCRIPT_TEMPLATE: &str = "\
// Read from stdin to handle test cases
function solution(input) {
  // Your code here
}

// Boilerplate to read from stdin
const fs = require('fs');
const input = fs.readFileSync(0, 'utf8').trim();
solution(input);";

const PYTHON_TEMPLATE: &str = "\
# Read from stdin to handle test cases
import sys

def solution():
    # Read from sys.stdin
    input_data = sys.stdin.read().strip()
    # Your code here
    print(input_data)

if __name__ == \"__main__\":
    solution()";

const CPP_TEMPLATE: &str = "\
// Read from stdin to handle test cases
#include <iostream>
#include <string>
using namespace std;

int main() {
    string input;
    while (getline(cin, input)) {
        // Your code here
        cout << input << endl;
    }
    return 0;
}";

const JAVA_TEMPLATE: &str = "\
// Read from stdin to handle test cases
import java.util.*;

public class Main {
    public static void main(String[] args) {
        Scanner sc = new Scanner(System.in);
        while (sc.hasNextLine()) {
            String input = sc.nextLine();
            // Your code here
            System.out.println(input);
        }
    }
}";

const C_TEMPLATE: &str = "\
// Read from stdin to handle test cases
#include <stdio.h>

int main() {
    char input[1024];
    while (fgets(input, sizeof(input), stdin)) {
        // Your code here
        printf(\"%s\", input);
    }
    return 0;
}";

impl LanguageId {
    /// Every language, in the order they are offered to the student.
    pub const ALL: [LanguageId; 5] = [
        LanguageId::JavaScript,
        LanguageId::Python,
        LanguageId::Cpp,
        LanguageId::Java,
        LanguageId::C,
    ];

    /// The language a question starts in.  Only this language may use the
    /// question's own starter code.
    pub const DEFAULT: LanguageId = LanguageId::JavaScript;

    /// Identifier used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Cpp => "cpp",
            Self::Java => "java",
            Self::C => "c",
        }
    }

    /// Human readable name, including the judge's toolchain version.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::JavaScript => "JavaScript",
            Self::Python => "Python 3",
            Self::Cpp => "C++ (GCC 10)",
            Self::Java => "Java 15",
            Self::C => "C (GCC 10)",
        }
    }

    /// Syntax mode for an editor.
    pub fn editor_mode(self) -> &'static str {
        self.as_str()
    }

    /// The generic source text used before a student has written anything
    /// in this language.
    pub fn template(self) -> &'static str {
        match self {
            Self::JavaScript => JAVASCRIPT_TEMPLATE,
            Self::Python => PYTHON_TEMPLATE,
            Self::Cpp => CPP_TEMPLATE,
            Self::Java => JAVA_TEMPLATE,
            Self::C => C_TEMPLATE,
        }
    }
}

impl Default for LanguageId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for LanguageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LanguageId {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "javascript" | "js" => Self::JavaScript,
            "python" | "py" => Self::Python,
            "cpp" | "c++" => Self::Cpp,
            "java" => Self::Java,
            "c" => Self::C,
            _ => return Err(Error::UnknownLanguage(s.to_string())),
        })
    }
}
