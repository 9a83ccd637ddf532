use carelink_core::aggregate::{condition_histogram, patient_overview};
use carelink_core::care_plan::PlanStatus;
use carelink_core::patient::NewPatient;
use carelink_core::query::{
    filter_care_plans, filter_patients, order_alerts, CarePlanFilter, PatientFilter, PatientSort,
    PatientSortField, SortDirection,
};
use carelink_core::seed;
use carelink_core::PatientId;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "carelink")]
#[command(about = "Carelink clinician portal CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dashboard aggregates
    Dashboard,
    /// List patients
    Patients {
        /// Substring match on the patient name
        #[arg(long)]
        search: Option<String>,
        /// Only patients carrying this condition label
        #[arg(long)]
        condition: Option<String>,
        /// Sort field: name or adherence
        #[arg(long, default_value = "name")]
        sort: String,
        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,
    },
    /// Enroll a new patient
    AddPatient {
        /// Full name
        name: String,
        /// Age in years
        age: u32,
        /// Gender label
        gender: String,
        /// Contact email
        #[arg(long, default_value = "")]
        email: String,
        /// Contact phone
        #[arg(long, default_value = "")]
        phone: String,
        /// Condition labels (comma-separated)
        #[arg(long)]
        conditions: Option<String>,
    },
    /// List care plans
    CarePlans {
        /// Substring match on title or description
        #[arg(long)]
        search: Option<String>,
        /// Status filter: draft, active or completed
        #[arg(long)]
        status: Option<String>,
        /// Only plans for this patient id
        #[arg(long)]
        patient: Option<String>,
    },
    /// List the global meal-plan set
    MealPlans,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut store = seed::demo_store()?;

    match cli.command {
        Some(Commands::Dashboard) => {
            let overview = patient_overview(store.patients());
            println!("Patients: {}", overview.total);
            match overview.average_adherence {
                Some(average) => println!("Average adherence: {average}%"),
                None => println!("Average adherence: no data"),
            }
            println!(
                "Adherence bands: high {}, medium {}, low {}",
                overview.buckets.high, overview.buckets.medium, overview.buckets.low
            );
            println!("Patients with alerts: {}", overview.with_alerts);

            println!("\nTop conditions:");
            for entry in condition_histogram(store.patients()) {
                println!("  {}: {}", entry.condition, entry.patients);
            }

            println!("\nRecent alerts:");
            let alerts = store.alerts();
            for alert in order_alerts(&alerts).into_iter().take(5) {
                let marker = if alert.is_read { " " } else { "*" };
                println!(
                    "  {marker} [{}] {} ({})",
                    alert.severity.as_str(),
                    alert.message,
                    alert.timestamp
                );
            }
        }
        Some(Commands::Patients {
            search,
            condition,
            sort,
            desc,
        }) => {
            let field = PatientSortField::parse(&sort)
                .ok_or_else(|| format!("unknown sort field: {sort}"))?;
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            let filter = PatientFilter {
                search: search.unwrap_or_default(),
                condition,
            };

            let patients = filter_patients(store.patients(), &filter, PatientSort { field, direction });
            if patients.is_empty() {
                println!("No patients found matching your search criteria");
            } else {
                for patient in patients {
                    println!(
                        "ID: {}, Name: {}, Adherence: {}, Conditions: {}",
                        patient.id,
                        patient.name,
                        patient.adherence_rate,
                        patient.conditions.join(", ")
                    );
                }
            }
        }
        Some(Commands::AddPatient {
            name,
            age,
            gender,
            email,
            phone,
            conditions,
        }) => {
            let conditions = conditions
                .map(|raw| {
                    raw.split(',')
                        .map(|c| c.trim().to_string())
                        .filter(|c| !c.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            let patient = store.add_patient(NewPatient {
                name,
                age,
                gender,
                email,
                phone,
                conditions,
                avatar: None,
            })?;
            println!(
                "Enrolled patient {} with ID {} (adherence {})",
                patient.name, patient.id, patient.adherence_rate
            );
        }
        Some(Commands::CarePlans {
            search,
            status,
            patient,
        }) => {
            let status = match status.as_deref() {
                None | Some("all") => None,
                Some(raw) => Some(
                    PlanStatus::parse(raw).ok_or_else(|| format!("unknown plan status: {raw}"))?,
                ),
            };
            let filter = CarePlanFilter {
                search: search.unwrap_or_default(),
                status,
                patient: patient.map(PatientId::new),
            };

            for plan in filter_care_plans(store.care_plans(), &filter) {
                let completion = carelink_core::aggregate::goal_completion_rate(plan);
                println!(
                    "ID: {}, Title: {}, Status: {}, Goals: {}% complete, Updated: {}",
                    plan.id,
                    plan.title,
                    plan.status.as_str(),
                    completion,
                    plan.updated_at
                );
            }
        }
        Some(Commands::MealPlans) => {
            for meal_plan in store.all_meal_plans() {
                println!(
                    "ID: {}, Name: {} ({} meals)",
                    meal_plan.id,
                    meal_plan.name,
                    meal_plan.meals.len()
                );
                for meal in &meal_plan.meals {
                    println!(
                        "    {} - {} kcal, {}g protein, {}g carbs, {}g fat",
                        meal.name,
                        meal.nutrition.calories,
                        meal.nutrition.protein,
                        meal.nutrition.carbs,
                        meal.nutrition.fat
                    );
                }
            }
        }
        None => {
            println!("carelink: use --help to list commands");
        }
    }

    Ok(())
}
