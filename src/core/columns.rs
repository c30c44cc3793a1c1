use crate::core::format::{
    assignee_name, date_only, money, person_name, rider_name, string_list, Column,
};
use crate::domain::model::Collection;

/// Fixed column layout for each export. The dashboard team treats these as
/// part of the report contract, so labels and order are stable.
pub fn columns_for(collection: Collection) -> Vec<Column> {
    match collection {
        Collection::Orders => order_columns(),
        Collection::Riders => rider_columns(),
        Collection::Transactions => transaction_columns(),
        Collection::Kyc => kyc_columns(),
        Collection::Tickets => ticket_columns(),
        Collection::Waitlist => waitlist_columns(),
    }
}

pub fn order_columns() -> Vec<Column> {
    vec![
        Column::new("orderId", "Order ID"),
        Column::with_formatter("createdAt", "Date", date_only),
        Column::with_formatter("customer", "Customer", person_name),
        Column::new("customer.phone", "Customer Phone"),
        Column::new("pickupLocation.address", "Pickup Address"),
        Column::new("pickupLocation.ghanaPostGPS", "Pickup GhanaPost GPS"),
        Column::new("dropoffLocation.address", "Dropoff Address"),
        Column::with_formatter("rider", "Rider", rider_name),
        Column::new("packageDetails.category", "Package"),
        Column::with_formatter("pricing.totalPrice", "Amount (GHS)", money),
        Column::new("payment.method", "Payment Method"),
        Column::new("payment.status", "Payment Status"),
        Column::new("status", "Status"),
    ]
}

pub fn rider_columns() -> Vec<Column> {
    vec![
        Column::new("riderId", "Rider ID"),
        Column::new("firstName", "First Name"),
        Column::new("lastName", "Last Name"),
        Column::new("phone", "Phone"),
        Column::new("email", "Email"),
        Column::new("city", "City"),
        Column::new("vehicle.type", "Vehicle Type"),
        Column::new("vehicle.registrationNumber", "Vehicle Number"),
        Column::new("kyc.status", "KYC Status"),
        Column::new("stats.completedDeliveries", "Completed Deliveries"),
        Column::new("stats.rating", "Rating"),
        Column::new("status", "Status"),
        Column::with_formatter("createdAt", "Joined", date_only),
    ]
}

pub fn transaction_columns() -> Vec<Column> {
    vec![
        Column::new("transactionId", "Transaction ID"),
        Column::with_formatter("createdAt", "Date", date_only),
        Column::new("orderId", "Order ID"),
        Column::with_formatter("customer", "Customer", person_name),
        Column::with_formatter("amount", "Amount (GHS)", money),
        Column::new("method", "Method"),
        Column::new("provider", "Provider"),
        Column::new("reference", "Reference"),
        Column::new("status", "Status"),
    ]
}

pub fn kyc_columns() -> Vec<Column> {
    vec![
        Column::new("applicationId", "Application ID"),
        Column::with_formatter("rider", "Rider", person_name),
        Column::new("rider.phone", "Phone"),
        Column::new("idDocument.type", "ID Type"),
        Column::new("idDocument.number", "ID Number"),
        Column::with_formatter("documents", "Documents", string_list),
        Column::with_formatter("submittedAt", "Submitted", date_only),
        Column::new("status", "Status"),
        Column::new("review.reviewedBy", "Reviewed By"),
        Column::new("review.notes", "Review Notes"),
    ]
}

pub fn ticket_columns() -> Vec<Column> {
    vec![
        Column::new("ticketId", "Ticket ID"),
        Column::with_formatter("createdAt", "Opened", date_only),
        Column::with_formatter("user", "Requester", person_name),
        Column::new("user.role", "Requester Role"),
        Column::new("subject", "Subject"),
        Column::new("category", "Category"),
        Column::new("priority", "Priority"),
        Column::with_formatter("assignee", "Assigned To", assignee_name),
        Column::new("status", "Status"),
        Column::with_formatter("updatedAt", "Last Update", date_only),
    ]
}

pub fn waitlist_columns() -> Vec<Column> {
    vec![
        Column::new("email", "Email"),
        Column::new("firstName", "First Name"),
        Column::new("city", "City"),
        Column::new("role", "Role"),
        Column::new("status", "Status"),
        Column::new("marketingOptIn", "Marketing Opt-in"),
        Column::with_formatter("createdAt", "Signed Up", date_only),
    ]
}
