use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use tracing::{info, Level};

use rs_rapid_kinematics::actions::{
    AbsoluteJointMovement, Action, Comment, Movement, MovementType, RobotTarget, SetDigitalOutput, SpeedData, Target,
    WaitDI, WaitTime, ZoneData,
};
use rs_rapid_kinematics::forward_kinematics::ForwardKinematics;
use rs_rapid_kinematics::inverse_kinematics::InverseKinematics;
use rs_rapid_kinematics::joint_position::{ExternalJointPosition, RobotJointPosition};
use rs_rapid_kinematics::rapid_format::fmt_pose;
use rs_rapid_kinematics::rapid_generator::RapidGenerator;
use rs_rapid_kinematics::robot::Robot;
use rs_rapid_kinematics::tool::RobotTool;

/// Kinematics of ABB robots and RAPID code generation.
#[derive(Parser, Debug)]
#[clap(author, version, name = "rs-rapid")]
struct CommandLineArguments {
    /// Preset name (irb120, irb1200, irb1600, irb2600, irb4600) or path to a YAML robot description
    #[arg(long, short, default_value = "irb120")]
    robot: String,

    /// Log debug messages
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the TCP plane for the joint values (degrees)
    Fk {
        #[arg(long, value_delimiter = ',', num_args = 6, allow_negative_numbers = true)]
        joints: Vec<f64>,
    },
    /// Print all eight configurations reaching the TCP target
    Ik {
        /// Target position x,y,z in millimeters
        #[arg(long, value_delimiter = ',', num_args = 3, allow_negative_numbers = true)]
        position: Vec<f64>,
        /// Target orientation as roll,pitch,yaw in degrees. The default points the tool along world X.
        #[arg(long, value_delimiter = ',', num_args = 3, allow_negative_numbers = true, default_value = "0,90,0")]
        rotation: Vec<f64>,
        /// Preferred configuration, 0 to 7
        #[arg(long)]
        configuration: Option<usize>,
    },
    /// Generate a small drawing program for the robot
    Demo {
        /// Directory to write the .mod and .sys files to. Without it, the code is printed.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn load_robot(name: &str) -> Result<Robot> {
    if let Some(robot) = Robot::preset(name) {
        return Ok(robot);
    }
    Robot::from_yaml_file(name).with_context(|| format!("Cannot load robot description from {}", name))
}

fn forward(robot: &Robot, joints: &[f64]) -> Result<()> {
    let joints = RobotJointPosition::from_slice(joints)?;
    let result = ForwardKinematics::new(robot).calculate(&joints, &ExternalJointPosition::default());
    println!("{}: {}", robot.name(), joints);
    println!("TCP: {}", fmt_pose(&result.tcp_plane));
    for error in &result.errors {
        println!("  {}", error);
    }
    Ok(())
}

fn inverse(robot: &Robot, position: &[f64], rotation: &[f64], configuration: Option<usize>) -> Result<()> {
    let (&[x, y, z], &[roll, pitch, yaw]) = (position, rotation) else {
        bail!("Expected 3 position and 3 rotation values");
    };
    let target = Isometry3::from_parts(
        Translation3::new(x, y, z),
        UnitQuaternion::from_euler_angles(roll.to_radians(), pitch.to_radians(), yaw.to_radians()),
    );
    let result = InverseKinematics::new(robot).calculate(&target, None, configuration, None);

    println!("{}: target {}", robot.name(), fmt_pose(&target));
    for (index, config) in result.configurations.iter().enumerate() {
        let mark = if result.selected == Some(index) { "*" } else { " " };
        if !config.reachable {
            println!("{}{}: unreachable", mark, index);
        } else if config.in_limits() {
            println!("{}{}: {}", mark, index, config.joints);
        } else {
            let axes: Vec<String> = config.out_of_limits.iter().map(|a| (a + 1).to_string()).collect();
            println!("{}{}: {} (axes {} out of limits)", mark, index, config.joints, axes.join(", "));
        }
    }
    for error in &result.errors {
        println!("  {}", error);
    }
    Ok(())
}

/// Square drawn with a pen in front of the robot, starting and ending at the home position.
fn demo_program(robot: &Robot, pen: &RobotTool) -> Result<Vec<Action>> {
    let home = RobotJointPosition([0.0, 0.0, 0.0, 0.0, 30.0, 0.0]);
    let center = ForwardKinematics::new(robot)
        .with_tool(pen)
        .calculate(&home, &ExternalJointPosition::default())
        .tcp_plane;

    let speed = SpeedData::new("vDraw", 50.0, 500.0, 5000.0, 1000.0)?;
    let zone = ZoneData::new("zDraw", 0.5)?;
    let approach = SpeedData::predefined("v200").context("v200 is predefined")?;

    let mut actions: Vec<Action> = vec![
        Comment::new("Draws a 60 mm square").into(),
        AbsoluteJointMovement::new("home", home, approach.clone(), ZoneData::fine()).into(),
        WaitDI::new("diPenReady", true, 5.0).into(),
    ];
    let corners = [(-30.0, -30.0), (30.0, -30.0), (30.0, 30.0), (-30.0, 30.0), (-30.0, -30.0)];
    for (i, (dx, dy)) in corners.iter().enumerate() {
        let plane = center * Isometry3::translation(*dx, *dy, 0.0);
        let target = RobotTarget::new(&format!("p{}", (i % 4) + 1), plane, 0)?;
        let movement = match i {
            0 => Movement::new(MovementType::MoveJ, Target::Robot(target), approach.clone(), ZoneData::fine())
                .with_digital_output(SetDigitalOutput::new("doPenDown", true)),
            _ => Movement::new(MovementType::MoveL, Target::Robot(target), speed.clone(), zone.clone()),
        };
        actions.push(movement.into());
    }
    actions.push(SetDigitalOutput::new("doPenDown", false).into());
    actions.push(WaitTime::new(0.5).into());
    actions.push(AbsoluteJointMovement::new("home", home, approach, ZoneData::fine()).into());
    Ok(actions)
}

fn demo(robot: &Robot, output: Option<PathBuf>) -> Result<()> {
    let pen = RobotTool::with_offset("tPen", 0.0, 0.0, 100.0, 0.2)?;
    let mut robot = robot.clone();
    robot.set_tool(&pen)?;
    let actions = demo_program(&robot, &pen)?;

    let mut generator = RapidGenerator::new(&robot);
    if let Some(directory) = &output {
        std::fs::create_dir_all(directory)
            .with_context(|| format!("Cannot create directory {}", directory.display()))?;
        generator = generator.with_path(directory);
    }
    generator.generate_program("DrawSquare", &actions)?;
    generator.generate_system("DrawData", &[pen], &[], &[])?;

    if !generator.warnings().is_empty() {
        info!("Generated with {} warnings", generator.warnings().len());
    }
    if output.is_some() {
        let written = generator.write_files()?;
        info!("{} RAPID files written", written.len());
    } else {
        print!("{}", generator.program_code());
        print!("{}", generator.system_code());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = CommandLineArguments::parse();
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let robot = load_robot(&args.robot)?;
    match args.command {
        Command::Fk { joints } => forward(&robot, &joints),
        Command::Ik { position, rotation, configuration } => inverse(&robot, &position, &rotation, configuration),
        Command::Demo { output } => demo(&robot, output),
    }
}
