//! Line-oriented terminal client over a [`ServerHandle`].

use std::fmt::Write as _;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::CommandResult;
use crate::server::{
    CreateFoodPayload, FoodItemView, FoodView, MealView, ProfilePayload, ProfileView, ReportView,
    ServerHandle,
};

pub const HELP: &str = "\
commands:
  profile                                              show your profile
  profile create <first> <last> <age> <kg> <cm> <gender> <goal...>
  profile update <first> <last> <age> <kg> <cm> <gender> <goal...>
  meal add <name>                                      start a meal
  meal list                                            today's meals
  food search <query...>                               search foods
  food add <meal#> <food id> <grams>                   log food to a meal
  food new <name...> <kcal> <protein> <carbs> <fat> <fiber>
                                                       add a food, values per 100 g
  report                                               today's totals
  help
  exit";

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Help,
    ShowProfile,
    CreateProfile(ProfilePayload),
    UpdateProfile(ProfilePayload),
    AddMeal(String),
    ListMeals,
    SearchFood(String),
    /// `meal_number` is 1-based as shown by `meal list`.
    AddFood {
        meal_number: u32,
        food_id: String,
        grams: f64,
    },
    CreateFood(CreateFoodPayload),
    Report,
    Exit,
    Empty,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => Ok(Command::Empty),
        ["help"] => Ok(Command::Help),
        ["exit"] | ["quit"] => Ok(Command::Exit),
        ["report"] => Ok(Command::Report),
        ["profile"] => Ok(Command::ShowProfile),
        ["profile", "create", rest @ ..] => parse_profile(rest).map(Command::CreateProfile),
        ["profile", "update", rest @ ..] => parse_profile(rest).map(Command::UpdateProfile),
        ["meal", "add", name @ ..] if !name.is_empty() => Ok(Command::AddMeal(name.join(" "))),
        ["meal", "list"] => Ok(Command::ListMeals),
        ["food", "search", query @ ..] if !query.is_empty() => {
            Ok(Command::SearchFood(query.join(" ")))
        }
        ["food", "add", meal, food_id, grams] => Ok(Command::AddFood {
            meal_number: meal_number(meal)?,
            food_id: food_id.to_string(),
            grams: number(grams, "grams")?,
        }),
        ["food", "new", name @ .., calories, protein, carbs, fat, fiber] if !name.is_empty() => {
            Ok(Command::CreateFood(CreateFoodPayload {
                name: name.join(" "),
                calories: number(calories, "calories")?,
                protein: number(protein, "protein")?,
                carbs: number(carbs, "carbs")?,
                fat: number(fat, "fat")?,
                fiber: number(fiber, "fiber")?,
            }))
        }
        _ => Err(format!("unrecognised command {:?}, try `help`", line.trim())),
    }
}

fn parse_profile(args: &[&str]) -> Result<ProfilePayload, String> {
    let [first, last, age, weight, height, gender, goal @ ..] = args else {
        return Err("usage: profile create <first> <last> <age> <kg> <cm> <gender> <goal...>".into());
    };
    Ok(ProfilePayload {
        first_name: first.to_string(),
        last_name: last.to_string(),
        age: number(age, "age")?,
        weight: number(weight, "weight")?,
        height: number(height, "height")?,
        gender: gender.to_string(),
        goal: goal.join(" "),
    })
}

fn meal_number(raw: &str) -> Result<u32, String> {
    raw.parse::<u32>()
        .ok()
        .filter(|&n| n >= 1)
        .ok_or_else(|| format!("meal number must be 1 or more, got {raw:?}"))
}

fn number<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("{what} must be a number, got {raw:?}"))
}

/// Read commands from `input` until `exit` or end of input.
pub async fn run<R, W>(handle: &ServerHandle, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(b"nutrition tracker, type `help` for commands\n").await?;
    loop {
        output.write_all(b"> ").await?;
        output.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = match parse_command(&line) {
            Ok(Command::Exit) => break,
            Ok(Command::Empty) => continue,
            Ok(command) => execute(handle, command).await,
            Err(usage) => usage,
        };
        output.write_all(text.as_bytes()).await?;
        output.write_all(b"\n").await?;
    }
    output.flush().await
}

async fn execute(handle: &ServerHandle, command: Command) -> String {
    let rendered: CommandResult<String> = match command {
        Command::Help => Ok(HELP.to_string()),
        Command::ShowProfile => handle.get_profile().await.map(|p| render_profile(&p)),
        Command::CreateProfile(payload) => handle
            .create_profile(payload)
            .await
            .map(|p| render_profile(&p)),
        Command::UpdateProfile(payload) => handle
            .update_profile(payload)
            .await
            .map(|p| render_profile(&p)),
        Command::AddMeal(name) => handle
            .add_meal(name.as_str())
            .await
            .map(|index| format!("added {name} as meal #{}", index + 1)),
        Command::ListMeals => handle.list_meals().await.map(|m| render_meals(&m)),
        Command::SearchFood(query) => handle.search_food(query).await.map(|f| render_foods(&f)),
        Command::AddFood {
            meal_number,
            food_id,
            grams,
        } => handle
            .add_food(i64::from(meal_number) - 1, food_id, grams)
            .await
            .map(|item| format!("added {}", render_item(&item))),
        Command::CreateFood(payload) => handle
            .create_food(payload)
            .await
            .map(|f| format!("created {}", render_foods(std::slice::from_ref(&f)))),
        Command::Report => handle.get_report().await.map(|r| render_report(&r)),
        Command::Exit | Command::Empty => Ok(String::new()),
    };
    rendered.unwrap_or_else(|err| format!("error: {err}"))
}

pub fn render_profile(p: &ProfileView) -> String {
    let body_fat = match p.body_fat_percent {
        Some(bf) => format!("{bf:.1}%"),
        None => "n/a".to_string(),
    };
    format!(
        "{} {}, {} years, {:.1} kg, {:.1} cm, {}\ngoal: {}\nBMI {:.1}, body fat {}",
        p.first_name, p.last_name, p.age, p.weight_kg, p.height_cm, p.gender, p.goal, p.bmi, body_fat
    )
}

pub fn render_meals(meals: &[MealView]) -> String {
    if meals.is_empty() {
        return "no meals logged today".to_string();
    }
    let mut out = String::new();
    for meal in meals {
        let _ = writeln!(
            out,
            "#{} {} ({}) {:.0} kcal",
            meal.index + 1,
            meal.name,
            meal.time,
            meal.totals.calories
        );
        for item in &meal.food_items {
            let _ = writeln!(out, "    {}", render_item(item));
        }
    }
    out.trim_end().to_string()
}

fn render_item(item: &FoodItemView) -> String {
    format!(
        "{:.0} g {} [{}]: {:.1} kcal, P {:.1} g, C {:.1} g, F {:.1} g, fiber {:.1} g",
        item.quantity_g,
        item.name,
        item.food_id,
        item.nutrients.calories,
        item.nutrients.protein,
        item.nutrients.carbs,
        item.nutrients.fat,
        item.nutrients.fiber
    )
}

pub fn render_foods(foods: &[FoodView]) -> String {
    if foods.is_empty() {
        return "no foods found".to_string();
    }
    foods
        .iter()
        .map(|f| {
            format!(
                "{:<12} {} (per 100 g: {:.0} kcal, P {:.1} g, C {:.1} g, F {:.1} g)",
                f.id, f.name, f.per_100g.calories, f.per_100g.protein, f.per_100g.carbs, f.per_100g.fat
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_report(r: &ReportView) -> String {
    format!(
        "{} ({} meals)\ncalories {:.1} kcal\nprotein  {:.1} g\ncarbs    {:.1} g\nfat      {:.1} g\nfiber    {:.1} g",
        r.date,
        r.meal_count,
        r.totals.calories,
        r.totals.protein,
        r.totals.carbs,
        r.totals.fat,
        r.totals.fiber
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use crate::clock::ManualClock;
    use crate::food::{FoodProvider, LocalCatalog};
    use crate::server::CommandServer;
    use crate::store::MemoryStore;
    use crate::test_utils::MockFdc;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("  ").unwrap(), Command::Empty);
        assert_eq!(parse_command("meal add late lunch").unwrap(), Command::AddMeal("late lunch".into()));
        assert_eq!(
            parse_command("food add 1 f1 150").unwrap(),
            Command::AddFood {
                meal_number: 1,
                food_id: "f1".into(),
                grams: 150.0
            }
        );
        let Command::CreateProfile(p) =
            parse_command("profile create Sam Lee 30 70 175 male lose some weight").unwrap()
        else {
            panic!("expected profile");
        };
        assert_eq!(p.goal, "lose some weight");
        assert_eq!(p.age, 30);

        let Command::CreateFood(food) = parse_command("food new peanut butter 588 25 20 50 6").unwrap()
        else {
            panic!("expected food new");
        };
        assert_eq!(food.name, "peanut butter");
        assert_eq!((food.calories, food.fiber), (588.0, 6.0));

        assert!(parse_command("food add one f1 150").is_err());
        assert!(parse_command("food add 0 f1 150").is_err());
        assert!(parse_command("food add -9223372036854775808 f1 10").is_err());
        assert!(parse_command("food new 588 25 20 50 6").is_err());
        assert!(parse_command("profile create Sam").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[tokio::test]
    async fn session_logs_food_and_reports() {
        let foods = FoodProvider::new(Arc::new(MockFdc::default()), LocalCatalog::seeded());
        let (handle, _server) = CommandServer::spawn(
            Arc::new(MemoryStore::new()),
            Arc::new(foods),
            Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 5, 5, 12, 0, 0).unwrap())),
        );

        let script = "meal add lunch\nfood add 1 f1 150\nfood add 4 f1 10\nreport\nexit\nmeal list\n";
        let mut out = Vec::new();
        run(&handle, script.as_bytes(), &mut out).await.unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("added lunch as meal #1"));
        assert!(out.contains("150 g Chicken Breast [f1]: 247.5 kcal"));
        assert!(out.contains("error: invalid meal index 3"));
        assert!(out.contains("calories 247.5 kcal"));
        assert!(out.contains("protein  46.5 g"));
        assert!(!out.contains("#1 lunch"), "commands after exit must not run");
    }

    #[tokio::test]
    async fn bad_meal_numbers_are_reported_and_the_session_goes_on() {
        let foods = FoodProvider::new(Arc::new(MockFdc::default()), LocalCatalog::seeded());
        let (handle, _server) = CommandServer::spawn(
            Arc::new(MemoryStore::new()),
            Arc::new(foods),
            Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 5, 6, 12, 0, 0).unwrap())),
        );

        let script = "meal add lunch\nfood add -9223372036854775808 f1 10\nfood add 0 f1 10\nfood add 1 f1 100\nreport\n";
        let mut out = Vec::new();
        run(&handle, script.as_bytes(), &mut out).await.unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("meal number must be 1 or more, got \"-9223372036854775808\""));
        assert!(out.contains("meal number must be 1 or more, got \"0\""));
        assert!(out.contains("calories 165.0 kcal"));
    }

    #[tokio::test]
    async fn new_food_can_be_logged_by_its_id() {
        let foods = FoodProvider::new(Arc::new(MockFdc::default()), LocalCatalog::seeded());
        let (handle, _server) = CommandServer::spawn(
            Arc::new(MemoryStore::new()),
            Arc::new(foods),
            Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 5, 7, 8, 0, 0).unwrap())),
        );

        let script = "food new peanut butter 588 25 20 50 6\nmeal add breakfast\nfood add 1 f6 30\nreport\n";
        let mut out = Vec::new();
        run(&handle, script.as_bytes(), &mut out).await.unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("created f6"), "{out}");
        assert!(out.contains("30 g peanut butter [f6]: 176.4 kcal"), "{out}");
        assert!(out.contains("fiber    1.8 g"), "{out}");
    }
}
