use coursesched::{CourseList, Field, Scheduler, SortSpec};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn print_help() {
    println!("Commands:");
    println!("  ADD <course id>");
    println!("  DROP <course id>");
    println!("  CLEAR");
    println!("  FIND [course id prefix]");
    println!("  SORT <courseId|instructorName|time|utilization> [asc|desc]");
    println!("  SCHEDULE");
    println!("  EXIT");
}

fn main() -> coursesched::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "data.csv".to_string());
    let mut scheduler = Scheduler::load(PathBuf::from(path))?;

    loop {
        let enrolled: Vec<String> = scheduler
            .enrolled()
            .iter()
            .map(|c| coursesched::course::text_of(c.course_id.as_ref()))
            .collect();
        println!("Current courses: {:?}", enrolled);

        print!("> ");
        std::io::stdout().flush()?;
        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let input: Vec<&str> = input.split_whitespace().collect();
        let Some(command) = input.first() else {
            print!("\x1B[2J\x1B[1;1H");
            println!("Please enter a command");
            print_help();
            continue;
        };

        match command.to_uppercase().as_str() {
            "ADD" | "+" if input.len() == 2 => match scheduler.table().get_course(input[1])? {
                Some(course) => {
                    if let Some(warning) = scheduler.enroll(course) {
                        println!("{warning}");
                    }
                }
                None => println!("Course not found"),
            },
            "DROP" | "-" if input.len() == 2 => {
                if scheduler.drop_course(&Field::from_cell(input[1])).is_none() {
                    println!("Course not enrolled");
                }
            }
            "CLEAR" | "--" => scheduler.clear(),
            "FIND" | "LS" => {
                print!("\x1B[2J\x1B[1;1H");
                let mut lazy = scheduler
                    .table()
                    .no_conflict_with(scheduler.enrolled())?
                    .to_lazy();
                if input.len() > 1 {
                    lazy = lazy.contains(&input[1..]);
                }
                println!("{}", lazy.collect()?);
            }
            "SORT" if input.len() >= 2 => {
                let spec = SortSpec::parse(input[1], input.get(2).copied().unwrap_or("asc"));
                let sorted = scheduler.sorted(&spec)?;
                println!("{}", sorted.iter().collect::<CourseList>());
            }
            "SCHEDULE" | "S" => {
                print!("\x1B[2J\x1B[1;1H");
                println!("{}", scheduler.enrolled().iter().collect::<CourseList>());
            }
            "EXIT" => break,
            _ => {
                print!("\x1B[2J\x1B[1;1H");
                println!("Invalid command");
                print_help();
            }
        }
    }

    Ok(())
}
