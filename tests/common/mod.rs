use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().join("tree");
        fs::create_dir_all(&root).expect("create tree root");
        Self { _tmp: tmp, root }
    }

    pub fn cmd(&self) -> Command {
        cargo_bin_cmd!("govlint")
    }

    pub fn root_str(&self) -> &str {
        self.root.to_str().expect("root path utf8")
    }

    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().expect("parent dir")).expect("create fixture dirs");
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }
}

/// A tree every check accepts: one skill, one agent depending on it, one
/// command invoking the agent, one rule file in canonical shape, and a
/// memory file mapping work to the agent.
pub fn make_clean_tree(env: &TestEnv) {
    env.write(
        "skills/commit/SKILL.md",
        concat!(
            "---\n",
            "name: commit\n",
            "description: Create conventional commits. Use when committing staged changes.\n",
            "metadata:\n",
            "  capability-level: 1\n",
            "---\n",
            "# Commit\n",
            "\n",
            "## Steps\n",
            "\n",
            "- Check staged changes\n",
            "- Execute the commit with a conventional message\n",
        ),
    );
    env.write(
        "agents/helper/AGENT.md",
        concat!(
            "---\n",
            "name: helper\n",
            "description: Routine maintenance agent for repository chores.\n",
            "tools: Read, Bash\n",
            "metadata:\n",
            "  capability-level: 1\n",
            "  default-skills:\n",
            "    - commit\n",
            "---\n",
            "# Helper\n",
            "\n",
            "## Behavior\n",
            "\n",
            "- Use skill:commit for commit work\n",
        ),
    );
    env.write(
        "commands/ship.md",
        concat!(
            "---\n",
            "description: Ship a release with the helper agent.\n",
            "---\n",
            "# Ship\n",
            "\n",
            "## Steps\n",
            "\n",
            "- Run agent:helper to prepare the branch\n",
            "- Push the release tag\n",
        ),
    );
    env.write(
        "rules/style.md",
        concat!(
            "## Scope\n",
            "\n",
            "- REQUIRED: apply these rules to all manifest bodies\n",
            "\n",
            "## Absolute-Prohibitions\n",
            "\n",
            "- PROHIBITED: emojis in manifest bodies\n",
            "\n",
            "## Communication-Protocol\n",
            "\n",
            "- REQUIRED: report findings with severity labels\n",
            "\n",
            "## Structural-Rules\n",
            "\n",
            "- REQUIRED: keep frontmatter keys in schema order\n",
            "\n",
            "## Language-Rules\n",
            "\n",
            "- REQUIRED: write imperative single-clause lines\n",
            "\n",
            "## Formatting-Rules\n",
            "\n",
            "- PROHIBITED: bold emphasis outside code fences\n",
            "\n",
            "## Naming-Rules\n",
            "\n",
            "- REQUIRED: use lowercase hyphenated names\n",
            "\n",
            "## Validation-Rules\n",
            "\n",
            "- REQUIRED: run the linter before promotion\n",
            "\n",
            "## Narrative-Detection\n",
            "\n",
            "- PROHIBITED: hedging vocabulary in rule bodies\n",
            "\n",
            "## Depth-Compatibility\n",
            "\n",
            "- OPTIONAL: declare capability tiers in metadata\n",
        ),
    );
    env.write(
        "CLAUDE.md",
        concat!(
            "# Project memory\n",
            "\n",
            "- agent:helper owns routine maintenance\n",
            "- Route commit work through skill: references\n",
        ),
    );
}
