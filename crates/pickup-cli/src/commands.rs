//! Command parsing and execution for the interactive front end.
//!
//! Each input line is parsed into one [`Command`] variant; dispatch is a
//! static match over the closed command set. All numeric and temporal
//! parsing happens here, so the core only ever sees typed values.

use chrono::{DateTime, Utc};
use pickup_core::{AcceptRequest, OrderService, ServiceError};
use pickup_types::{parse_deadline, Order, ParseError, TIME_LAYOUT};
use std::path::PathBuf;
use thiserror::Error;

use crate::table;

const USAGE_ACCEPT_ORDER: &str =
	"usage: accept_order <orderID> <customerID> <deadline> <weight> <cost> [package_type[+wrapper]]";
const USAGE_RETURN_COURIER: &str = "usage: return_to_courier <orderID>";
const USAGE_PROCESS_CUSTOMER: &str =
	"usage: process_customer <customerID> <handout|return> <orderID> [orderID ...]";
const USAGE_LIST_ORDERS: &str = "usage: list_orders <customerID> [last <N>] [pvz] [pageSize <N>]";
const USAGE_LIST_RETURNS: &str = "usage: list_returns [pageSize <N>]";
const USAGE_ACCEPT_FILE: &str = "usage: accept_orders_file <filename>";

const HELP_TEXT: &str = "Available commands:
	help                          - print this command list
	exit                          - quit the program
	clear                         - clear the terminal

	accept_order <orderID> <customerID> <deadline> <weight> <cost> [package_type[+wrapper]]
		Accept an order from a courier.
		deadline is either \"YYYY-MM-DDTHH:MM:SS\"
		or a relative duration such as \"30s\" or \"48h\"
		weight - parcel weight in kg
		cost - order cost
		package_type - packaging (box, bag, film)
		wrapper - additional wrapper (film)
		Examples:
			accept_order 1 1 48h 5.0 100.0 box
			accept_order 1 1 48h 5.0 100.0 box+film
			accept_order 1 1 2030-02-20T15:04:05 5.0 100.0 bag+film

	return_to_courier <orderID>
		Hand an order back to the courier.

	process_customer <customerID> <handout|return> <orderID> [orderID ...]
		Hand orders out to a customer or take a customer return.

	list_orders <customerID> [last <N>] [pvz] [pageSize <N>]
		List a customer's orders, most recently updated first.
		pvz keeps only orders still awaiting pickup.

	list_returns [pageSize <N>]
		List customer returns, most recent first.

	order_history
		Show all orders, most recently updated first.

	accept_orders_file <filename>
		Accept orders from the given JSON file.

	clear_db
		Wipe the order database.";

/// Errors produced while parsing or executing a command line.
#[derive(Debug, Error)]
pub enum CommandError {
	#[error("unknown command '{0}', type help for the command list")]
	Unknown(String),
	#[error("{0}")]
	Usage(&'static str),
	#[error("invalid number: {0}")]
	InvalidNumber(String),
	#[error("page size must be greater than zero")]
	InvalidPageSize,
	#[error("unknown action '{0}', expected handout or return")]
	UnknownAction(String),
	#[error(transparent)]
	Parse(#[from] ParseError),
	#[error(transparent)]
	Service(#[from] ServiceError),
}

/// What a `process_customer` command does with each order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerAction {
	Handout,
	Return,
}

/// The closed set of interactive commands.
#[derive(Debug, PartialEq)]
pub enum Command {
	Help,
	Exit,
	Clear,
	ClearDb,
	OrderHistory,
	AcceptOrder(AcceptRequest),
	ReturnToCourier {
		order_id: i64,
	},
	ProcessCustomer {
		customer_id: i64,
		action: CustomerAction,
		order_ids: Vec<i64>,
	},
	ListOrders {
		customer_id: i64,
		last_n: usize,
		only_awaiting_pickup: bool,
		page_size: Option<usize>,
	},
	ListReturns {
		page_size: Option<usize>,
	},
	AcceptOrdersFile {
		path: PathBuf,
	},
}

impl Command {
	/// Parses one input line. Relative deadlines are resolved against `now`.
	/// Blank lines parse to `None`.
	pub fn parse(line: &str, now: DateTime<Utc>) -> Result<Option<Command>, CommandError> {
		let mut parts = line.split_whitespace();
		let Some(name) = parts.next() else {
			return Ok(None);
		};
		let args: Vec<&str> = parts.collect();

		let command = match name {
			"help" => Command::Help,
			"exit" => Command::Exit,
			"clear" => Command::Clear,
			"clear_db" => Command::ClearDb,
			"order_history" => Command::OrderHistory,
			"accept_order" => parse_accept_order(&args, now)?,
			"return_to_courier" => Command::ReturnToCourier {
				order_id: parse_i64(args.first().ok_or(CommandError::Usage(USAGE_RETURN_COURIER))?)?,
			},
			"process_customer" => parse_process_customer(&args)?,
			"list_orders" => parse_list_orders(&args)?,
			"list_returns" => parse_list_returns(&args)?,
			"accept_orders_file" => Command::AcceptOrdersFile {
				path: PathBuf::from(args.first().ok_or(CommandError::Usage(USAGE_ACCEPT_FILE))?),
			},
			other => return Err(CommandError::Unknown(other.to_string())),
		};
		Ok(Some(command))
	}
}

fn parse_i64(token: &str) -> Result<i64, CommandError> {
	token
		.parse()
		.map_err(|_| CommandError::InvalidNumber(token.to_string()))
}

fn parse_f64(token: &str) -> Result<f64, CommandError> {
	token
		.parse()
		.map_err(|_| CommandError::InvalidNumber(token.to_string()))
}

fn parse_usize(token: &str) -> Result<usize, CommandError> {
	token
		.parse()
		.map_err(|_| CommandError::InvalidNumber(token.to_string()))
}

fn parse_accept_order(args: &[&str], now: DateTime<Utc>) -> Result<Command, CommandError> {
	if args.len() < 5 {
		return Err(CommandError::Usage(USAGE_ACCEPT_ORDER));
	}

	let (package_type, wrapper) = match args.get(5) {
		// The combined token splits here; the core receives typed values.
		Some(token) => match token.split_once('+') {
			Some((package, wrapper)) => {
				(Some(package.parse()?), Some(wrapper.parse()?))
			}
			None => (Some(token.parse()?), None),
		},
		None => (None, None),
	};

	Ok(Command::AcceptOrder(AcceptRequest {
		id: parse_i64(args[0])?,
		customer_id: parse_i64(args[1])?,
		deadline_at: parse_deadline(args[2], now)?,
		weight: parse_f64(args[3])?,
		cost: parse_f64(args[4])?,
		package_type,
		wrapper,
	}))
}

fn parse_process_customer(args: &[&str]) -> Result<Command, CommandError> {
	if args.len() < 3 {
		return Err(CommandError::Usage(USAGE_PROCESS_CUSTOMER));
	}

	let action = match args[1] {
		"handout" => CustomerAction::Handout,
		"return" => CustomerAction::Return,
		other => return Err(CommandError::UnknownAction(other.to_string())),
	};
	let order_ids = args[2..]
		.iter()
		.map(|token| parse_i64(token))
		.collect::<Result<Vec<i64>, _>>()?;

	Ok(Command::ProcessCustomer {
		customer_id: parse_i64(args[0])?,
		action,
		order_ids,
	})
}

fn parse_list_orders(args: &[&str]) -> Result<Command, CommandError> {
	let Some(first) = args.first() else {
		return Err(CommandError::Usage(USAGE_LIST_ORDERS));
	};

	let customer_id = parse_i64(first)?;
	let mut last_n = 0;
	let mut only_awaiting_pickup = false;
	let mut page_size = None;

	let mut rest = args[1..].iter();
	while let Some(flag) = rest.next() {
		match *flag {
			"last" => {
				let value = rest.next().ok_or(CommandError::Usage(USAGE_LIST_ORDERS))?;
				last_n = parse_usize(value)?;
			}
			"pvz" => only_awaiting_pickup = true,
			"pageSize" => {
				let value = rest.next().ok_or(CommandError::Usage(USAGE_LIST_ORDERS))?;
				page_size = Some(parse_page_size(value)?);
			}
			_ => return Err(CommandError::Usage(USAGE_LIST_ORDERS)),
		}
	}

	Ok(Command::ListOrders {
		customer_id,
		last_n,
		only_awaiting_pickup,
		page_size,
	})
}

fn parse_list_returns(args: &[&str]) -> Result<Command, CommandError> {
	let page_size = match args {
		[] => None,
		["pageSize", value] => Some(parse_page_size(value)?),
		_ => return Err(CommandError::Usage(USAGE_LIST_RETURNS)),
	};
	Ok(Command::ListReturns { page_size })
}

fn parse_page_size(token: &str) -> Result<usize, CommandError> {
	let size = parse_usize(token)?;
	if size == 0 {
		return Err(CommandError::InvalidPageSize);
	}
	Ok(size)
}

/// Executes parsed commands against the lifecycle service.
pub struct Handler {
	service: OrderService,
	default_page_size: usize,
}

impl Handler {
	pub fn new(service: OrderService, default_page_size: usize) -> Self {
		Self {
			service,
			default_page_size,
		}
	}

	/// Runs one command. `now` is sampled once per command by the caller
	/// and threaded through every check.
	pub async fn execute(&self, command: Command, now: DateTime<Utc>) -> Result<(), CommandError> {
		match command {
			Command::Help => println!("{HELP_TEXT}"),
			Command::Clear => clear_terminal(),
			Command::OrderHistory => {
				let orders = self.service.order_history().await;
				if orders.is_empty() {
					println!("No orders yet.");
				} else {
					self.print_orders(&orders, usize::MAX);
				}
			}
			Command::AcceptOrder(request) => {
				let final_cost = self.service.accept_order(request, now).await?;
				println!("Order accepted. Final cost: {final_cost:.2}");
			}
			Command::ReturnToCourier { order_id } => {
				self.service.return_order_to_courier(order_id, now).await?;
				println!("Order {order_id} returned to courier.");
			}
			Command::ProcessCustomer {
				customer_id,
				action,
				order_ids,
			} => {
				for order_id in order_ids {
					match action {
						CustomerAction::Handout => {
							self.service.deliver_order(order_id, customer_id, now).await?;
							println!("Order {order_id} handed out to customer {customer_id}.");
						}
						CustomerAction::Return => {
							self.service
								.process_return_order(order_id, customer_id, now)
								.await?;
							println!("Return accepted for order {order_id}.");
						}
					}
				}
			}
			Command::ListOrders {
				customer_id,
				last_n,
				only_awaiting_pickup,
				page_size,
			} => {
				let orders = self
					.service
					.list_orders(customer_id, last_n, only_awaiting_pickup, now)
					.await;
				if orders.is_empty() {
					println!("No orders.");
				} else {
					self.print_orders(&orders, page_size.unwrap_or(self.default_page_size));
				}
			}
			Command::ListReturns { page_size } => {
				let returns = self.service.list_returns().await;
				if returns.is_empty() {
					println!("No returns.");
				} else {
					self.print_returns(&returns, page_size.unwrap_or(self.default_page_size));
				}
			}
			Command::AcceptOrdersFile { path } => {
				let accepted = self.service.accept_orders_from_file(&path, now).await?;
				for record in &accepted {
					println!(
						"Order {} accepted. Final cost: {:.2}",
						record.id, record.final_cost
					);
				}
				println!("Imported {} orders.", accepted.len());
			}
			// Exit and ClearDb are handled by the input loop.
			Command::Exit | Command::ClearDb => {}
		}
		Ok(())
	}

	/// Wipes the database; the confirmation prompt lives in the input loop.
	pub async fn clear_db(&self) -> Result<(), CommandError> {
		self.service.clear_all().await?;
		println!("Database cleared.");
		Ok(())
	}

	fn print_orders(&self, orders: &[Order], page_size: usize) {
		let headers = [
			"ID", "Customer", "Deadline", "State", "Weight", "Cost", "Packaging", "Updated",
			"Delivered", "Returned",
		];
		let rows: Vec<Vec<String>> = orders
			.iter()
			.map(|order| {
				vec![
					order.id.to_string(),
					order.customer_id.to_string(),
					format_time(order.deadline_at),
					order.state.to_string(),
					format!("{:.2}", order.weight),
					format!("{:.2}", order.cost),
					order.packaging_label(),
					format_time(order.updated_at),
					format_opt_time(order.delivered_at),
					format_opt_time(order.returned_at),
				]
			})
			.collect();
		print_paged(&headers, &rows, page_size);
	}

	fn print_returns(&self, returns: &[Order], page_size: usize) {
		let headers = ["ID", "Customer", "Returned"];
		let rows: Vec<Vec<String>> = returns
			.iter()
			.map(|order| {
				vec![
					order.id.to_string(),
					order.customer_id.to_string(),
					format_opt_time(order.returned_at),
				]
			})
			.collect();
		print_paged(&headers, &rows, page_size);
	}
}

fn print_paged(headers: &[&str], rows: &[Vec<String>], page_size: usize) {
	let total_pages = rows.len().div_ceil(page_size.max(1));
	for (index, page) in rows.chunks(page_size.max(1)).enumerate() {
		print!("{}", table::render(headers, page));
		if total_pages > 1 {
			println!(
				"Page {} of {} ({} rows total)",
				index + 1,
				total_pages,
				rows.len()
			);
		}
	}
}

fn format_time(time: DateTime<Utc>) -> String {
	time.format(TIME_LAYOUT).to_string()
}

fn format_opt_time(time: Option<DateTime<Utc>>) -> String {
	time.map(format_time).unwrap_or_else(|| "-".to_string())
}

fn clear_terminal() {
	print!("\x1B[H\x1B[2J");
}
