//! Turns a list of actions into a RAPID program module and writes the system module with the
//! tool and work object data.
//!
//! Program generation makes two passes over the actions. The first pass collects the
//! declarations, each kind in its own table keyed by the declared name. The second pass
//! collects the instructions in the order of the actions. Both passes start with the tool of
//! the robot and switch tools at every [`OverrideRobotTool`](crate::actions::OverrideRobotTool).
//! Problems with single actions become warnings; the rest of the program is still generated.

use std::collections::{BTreeMap, HashMap};
#[cfg(feature = "allow_filesystem")]
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::actions::{validate_name, Action, CodeContext, Declaration, DeclarationKind, RapidAction};
use crate::error::Result;
use crate::robot::Robot;
use crate::tool::RobotTool;
use crate::work_object::WorkObject;

const DECLARATION_INDENT: &str = "    ";
const INSTRUCTION_INDENT: &str = "        ";

/// Data every ABB controller declares in the BASE module.
const BASE_DECLARATIONS: [&str; 3] = [
    "PERS tooldata tool0 := [TRUE, [[0, 0, 0], [1, 0, 0, 0]], [0.001, [0, 0, 0.001], [1, 0, 0, 0], 0, 0, 0]];",
    "PERS wobjdata wobj0 := [FALSE, TRUE, \"\", [[0, 0, 0], [1, 0, 0, 0]], [[0, 0, 0], [1, 0, 0, 0]]];",
    "PERS loaddata load0 := [0.001, [0, 0, 0.001], [1, 0, 0, 0], 0, 0, 0];",
];

fn header() -> String {
    format!(
        "! This RAPID code was generated with {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

/// What happened to a declaration passed to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Insertion {
    Added,
    /// The name is already declared with the same text.
    Shared,
    /// The name is already declared with the same data type but other values.
    Collision,
    /// The name is already declared with another data type, given here.
    TypeConflict(String),
}

/// Declarations of one kind, deduplicated by name, in the order they were first seen.
#[derive(Debug, Clone, Default)]
struct DeclarationTable {
    by_name: HashMap<String, Declaration>,
    lines: Vec<String>,
    names: Vec<String>,
}

impl DeclarationTable {
    fn insert(&mut self, declaration: Declaration) -> Insertion {
        match self.by_name.get(&declaration.name) {
            Some(existing) if existing.text == declaration.text => Insertion::Shared,
            Some(existing) if existing.data_type() != declaration.data_type() => {
                Insertion::TypeConflict(existing.data_type().unwrap_or_default().to_string())
            }
            Some(_) => Insertion::Collision,
            None => {
                self.names.push(declaration.name.clone());
                self.lines.push(declaration.text.clone());
                self.by_name.insert(declaration.name.clone(), declaration);
                Insertion::Added
            }
        }
    }
}

/// RAPID code generation session for one robot.
#[derive(Debug, Clone)]
pub struct RapidGenerator {
    /// Copy of the robot, so the caller can keep changing its own.
    robot: Robot,
    program_name: String,
    system_name: String,
    program_code: String,
    system_code: String,
    tables: BTreeMap<DeclarationKind, DeclarationTable>,
    custom_declarations: Vec<String>,
    warnings: Vec<String>,
    /// Directory the modules are written to. Nothing is written without it.
    #[cfg(feature = "allow_filesystem")]
    path: Option<PathBuf>,
}

impl RapidGenerator {
    pub fn new(robot: &Robot) -> Self {
        RapidGenerator {
            robot: robot.clone(),
            program_name: "MainModule".to_string(),
            system_name: "BASE".to_string(),
            program_code: String::new(),
            system_code: String::new(),
            tables: BTreeMap::new(),
            custom_declarations: Vec::new(),
            warnings: Vec::new(),
            #[cfg(feature = "allow_filesystem")]
            path: None,
        }
    }

    #[cfg(feature = "allow_filesystem")]
    pub fn with_path(mut self, directory: &Path) -> Self {
        self.path = Some(directory.to_path_buf());
        self
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    pub fn program_code(&self) -> &str {
        &self.program_code
    }

    pub fn system_code(&self) -> &str {
        &self.system_code
    }

    /// Problems found during the last generation.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Names declared by the last program generation, for one kind of declaration.
    pub fn declared_names(&self, kind: DeclarationKind) -> Vec<&str> {
        self.tables
            .get(&kind)
            .map(|table| table.names.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }

    /// Returns false if the name already holds another data type, so the instruction of the
    /// action would reference a variable of the wrong type.
    fn register(&mut self, index: usize, declaration: Declaration) -> bool {
        if declaration.kind == DeclarationKind::Custom {
            self.custom_declarations.push(declaration.text);
            return true;
        }
        let name = declaration.name.clone();
        let kind = declaration.kind;
        let data_type = declaration.data_type().unwrap_or_default().to_string();
        match self.tables.entry(kind).or_default().insert(declaration) {
            Insertion::Added | Insertion::Shared => true,
            Insertion::Collision => {
                self.warn(format!(
                    "Action {}: the name {} is already used by another {:?} declaration with different values, \
                     this declaration is skipped.",
                    index, name, kind
                ));
                true
            }
            Insertion::TypeConflict(existing) => {
                self.warn(format!(
                    "Action {}: the name {} is already declared as {} and cannot be a {}, \
                     the instruction is commented out.",
                    index, name, existing, data_type
                ));
                false
            }
        }
    }

    /// Generates the program module with a `main` procedure performing the actions.
    pub fn generate_program(&mut self, program_name: &str, actions: &[Action]) -> Result<&str> {
        validate_name("Program", program_name)?;
        self.program_name = program_name.to_string();
        self.tables.clear();
        self.custom_declarations.clear();
        self.warnings.clear();

        let mut valid = Vec::with_capacity(actions.len());
        for (index, action) in actions.iter().enumerate() {
            let result = action.validate();
            if let Err(error) = &result {
                self.warn(format!("Action {} ({}) is skipped: {}", index, action.kind(), error));
            }
            valid.push(result.is_ok());
        }

        // Pass 1: declarations
        let mut conflicting = vec![false; actions.len()];
        let mut tool = self.robot.tool().clone();
        for (index, action) in actions.iter().enumerate() {
            if !valid[index] {
                continue;
            }
            if let Action::OverrideRobotTool(over) = action {
                tool = over.tool.clone();
                continue;
            }
            let mut warnings = Vec::new();
            let context = CodeContext { robot: &self.robot, tool: &tool, index };
            let declarations = action.to_rapid_declarations(&context, &mut warnings);
            for message in warnings {
                self.warn(message);
            }
            for declaration in declarations {
                if !self.register(index, declaration) {
                    conflicting[index] = true;
                }
            }
        }

        // Pass 2: instructions
        let mut tool = self.robot.tool().clone();
        let mut instructions = Vec::new();
        for (index, action) in actions.iter().enumerate() {
            if !valid[index] {
                continue;
            }
            if let Action::OverrideRobotTool(over) = action {
                tool = over.tool.clone();
                continue;
            }
            let context = CodeContext { robot: &self.robot, tool: &tool, index };
            if let Some(code) = action.to_rapid_instruction(&context) {
                let comment = if conflicting[index] { "! " } else { "" };
                instructions.extend(code.lines().map(|line| format!("{}{}{}", INSTRUCTION_INDENT, comment, line)));
            }
        }

        let declarations: Vec<String> = self
            .tables
            .values()
            .flat_map(|table| table.lines.iter())
            .chain(self.custom_declarations.iter())
            .map(|line| format!("{}{}", DECLARATION_INDENT, line))
            .collect();
        debug!(
            "Program {}: {} declarations, {} instruction lines",
            program_name,
            declarations.len(),
            instructions.len()
        );

        let mut code = Vec::new();
        code.push(format!("MODULE {}", program_name));
        code.push(format!("{}{}", DECLARATION_INDENT, header()));
        code.push(String::new());
        if !declarations.is_empty() {
            code.extend(declarations);
            code.push(String::new());
        }
        code.push(format!("{}PROC main()", DECLARATION_INDENT));
        code.extend(instructions);
        code.push(format!("{}ENDPROC", DECLARATION_INDENT));
        code.push("ENDMODULE".to_string());

        self.program_code = code.join("\n") + "\n";
        Ok(&self.program_code)
    }

    /// Generates the system module holding the tool and work object data. The BASE module also
    /// gets the controller defaults `tool0`, `wobj0` and `load0`.
    pub fn generate_system(
        &mut self,
        system_name: &str,
        tools: &[RobotTool],
        work_objects: &[WorkObject],
        custom_lines: &[String],
    ) -> Result<&str> {
        validate_name("System", system_name)?;
        self.system_name = system_name.to_string();
        let base = system_name == "BASE";

        let mut code = Vec::new();
        if base {
            code.push(format!("MODULE {} (SYSMODULE, NOSTEPIN, VIEWONLY)", system_name));
        } else {
            code.push(format!("MODULE {} (SYSMODULE)", system_name));
        }
        code.push(format!("{}{}", DECLARATION_INDENT, header()));
        code.push(String::new());

        let mut declared: HashMap<String, String> = HashMap::new();
        let mut lines = Vec::new();
        if base {
            for (name, line) in ["tool0", "wobj0", "load0"].into_iter().zip(BASE_DECLARATIONS) {
                declared.insert(name.to_string(), line.to_string());
                lines.push(line.to_string());
            }
        }

        let data = tools
            .iter()
            .map(|tool| (tool.name.clone(), tool.validate().map(|_| tool.to_rapid_declaration())))
            .chain(
                work_objects
                    .iter()
                    .map(|wobj| (wobj.name.clone(), wobj.validate().map(|_| wobj.to_rapid_declaration()))),
            )
            .collect::<Vec<_>>();
        for (name, declaration) in data {
            match declaration {
                Err(error) => self.warn(format!("System data {} is skipped: {}", name, error)),
                Ok(text) => match declared.get(&name) {
                    None => {
                        declared.insert(name, text.clone());
                        lines.push(text);
                    }
                    // Predefined data is allowed to be passed again
                    Some(_) if base && ["tool0", "wobj0", "load0"].contains(&name.as_str()) => {}
                    Some(existing) if *existing == text => {}
                    Some(_) => self.warn(format!(
                        "System data {} is declared twice with different values, the second one is skipped.",
                        name
                    )),
                },
            }
        }
        lines.extend(custom_lines.iter().cloned());

        code.extend(lines.into_iter().map(|line| format!("{}{}", DECLARATION_INDENT, line)));
        code.push("ENDMODULE".to_string());

        self.system_code = code.join("\n") + "\n";
        Ok(&self.system_code)
    }

    /// Writes `<program>.mod` and `<system>.sys` into the directory set with `with_path`.
    /// Does nothing if no directory is set. Returns the written files.
    #[cfg(feature = "allow_filesystem")]
    pub fn write_files(&self) -> Result<Vec<PathBuf>> {
        let Some(directory) = &self.path else {
            debug!("No output directory, RAPID files are not written");
            return Ok(Vec::new());
        };
        let mut written = Vec::new();
        if !self.program_code.is_empty() {
            let file = directory.join(format!("{}.mod", self.program_name));
            std::fs::write(&file, &self.program_code)?;
            written.push(file);
        }
        if !self.system_code.is_empty() {
            let file = directory.join(format!("{}.sys", self.system_name));
            std::fs::write(&file, &self.system_code)?;
            written.push(file);
        }
        for file in &written {
            tracing::info!("Written {}", file.display());
        }
        Ok(written)
    }
}
